//! Noble houses, their rulers and successions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Highest prestige.
pub const MAX_PRESTIGE: i32 = 100;
/// Rulers younger than this never die of old age.
const MORTALITY_AGE: u32 = 55;
/// Monthly death chance per year past [`MORTALITY_AGE`].
const MORTALITY_PER_YEAR: f64 = 0.005;
/// Prestige lost when a house has to crown a stranger.
const UNPREPARED_SUCCESSION_PENALTY: i32 = 10;

/// Names drawn for rulers crowned without a named heir.
const GIVEN_NAMES: [&str; 8] = [
    "Aldous", "Berengar", "Cressida", "Dorian", "Elsbeth", "Fenwick", "Gisela", "Hadrian",
];

/// A living person of the house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Noble {
    /// Given name
    pub name: String,
    /// Age in years
    pub age: u32,
}

impl Noble {
    /// Creates a noble.
    #[must_use]
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

/// A noble house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct House {
    /// Faction this house leads or serves
    pub faction: String,
    /// Current head of the house
    pub ruler: Noble,
    /// Designated successor
    pub heir: Option<Noble>,
    /// Standing among the nobility (0-100)
    pub prestige: i32,
    /// Past rulers, oldest first
    pub past_rulers: Vec<String>,
}

impl Default for House {
    fn default() -> Self {
        Self {
            faction: String::new(),
            ruler: Noble::new("Unknown", 40),
            heir: None,
            prestige: 50,
            past_rulers: Vec::new(),
        }
    }
}

/// All noble houses by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynastyState {
    /// Houses by name
    pub houses: BTreeMap<String, House>,
}

impl DynastyState {
    /// Creates an empty peerage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjusts a house's prestige. Returns the new value.
    pub fn adjust_prestige(&mut self, house: &str, delta: i32) -> i32 {
        let house = self.houses.entry(house.to_string()).or_default();
        house.prestige = house.prestige.saturating_add(delta).clamp(0, MAX_PRESTIGE);
        house.prestige
    }

    /// Names (or replaces) a house's heir.
    pub fn name_heir(&mut self, house: &str, heir: &str, age: u32) {
        self.houses.entry(house.to_string()).or_default().heir = Some(Noble::new(heir, age));
    }

    /// Everyone in every house grows a year older.
    pub fn age_all(&mut self) {
        for house in self.houses.values_mut() {
            house.ruler.age = house.ruler.age.saturating_add(1);
            if let Some(heir) = &mut house.heir {
                heir.age = heir.age.saturating_add(1);
            }
        }
    }

    /// Passes the crown of `house` to its heir, or to a stranger when there
    /// is none. Returns the new ruler's name.
    pub fn succeed(&mut self, house: &str, rng: &mut dyn RandomSource) -> Option<String> {
        let entry = self.houses.get_mut(house)?;
        let new_ruler = match entry.heir.take() {
            Some(heir) => heir,
            None => {
                entry.prestige = entry
                    .prestige
                    .saturating_sub(UNPREPARED_SUCCESSION_PENALTY)
                    .clamp(0, MAX_PRESTIGE);
                Noble::new(GIVEN_NAMES[rng.index(GIVEN_NAMES.len())], 25)
            },
        };
        let old = std::mem::replace(&mut entry.ruler, new_ruler);
        entry.past_rulers.push(old.name);
        tracing::info!("{} now rules House {house}", entry.ruler.name);
        Some(entry.ruler.name.clone())
    }

    /// Rolls old-age mortality for every ruler. Returns `(house, new ruler)`
    /// for each succession.
    pub fn roll_mortality(&mut self, rng: &mut dyn RandomSource) -> Vec<(String, String)> {
        let names: Vec<String> = self.houses.keys().cloned().collect();
        let mut successions = Vec::new();
        for name in names {
            let age = self.houses.get(&name).map_or(0, |h| h.ruler.age);
            let chance = f64::from(age.saturating_sub(MORTALITY_AGE)) * MORTALITY_PER_YEAR;
            if chance > 0.0 && rng.chance(chance) {
                if let Some(ruler) = self.succeed(&name, rng) {
                    successions.push((name, ruler));
                }
            }
        }
        successions
    }
}

impl Subsystem for DynastyState {
    fn name(&self) -> &'static str {
        "dynasties"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for house in self.houses.values_mut() {
            house.prestige = house.prestige.clamp(0, MAX_PRESTIGE);
        }
        if !self.houses.is_empty() {
            return;
        }
        let seeds = [
            ("Valmere", "Kingdom of Valmere", Noble::new("Aldric", 58), Some(Noble::new("Edmund", 24)), 70),
            ("Draskov", "Iron Pact", Noble::new("Brannoc", 47), None, 55),
            ("Orrin", "Free Cities", Noble::new("Selene", 35), Some(Noble::new("Tamsin", 12)), 40),
        ];
        for (name, faction, ruler, heir, prestige) in seeds {
            self.houses.insert(
                name.to_string(),
                House {
                    faction: faction.to_string(),
                    ruler,
                    heir,
                    prestige,
                    past_rulers: Vec::new(),
                },
            );
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Monthly {
            return Vec::new();
        }
        if ctx.date.month == 1 {
            self.age_all();
        }
        self.roll_mortality(ctx.rng)
            .into_iter()
            .map(|(house, ruler)| WorldSignal::Succession { house, ruler })
            .collect()
    }

    fn summary(&self) -> String {
        if self.houses.is_empty() {
            return "No great houses".to_string();
        }
        self.houses
            .iter()
            .map(|(name, house)| {
                let heir = house
                    .heir
                    .as_ref()
                    .map_or_else(|| "no heir".to_string(), |h| format!("heir {}", h.name));
                format!(
                    "House {name}: {} ({}), {heir}, prestige {}",
                    house.ruler.name, house.ruler.age, house.prestige
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
