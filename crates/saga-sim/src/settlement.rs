//! Settlements: owner, population, prosperity and defense.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Prosperity and defense bounds.
pub const MAX_RATING: i32 = 100;
/// Prosperity at which a settlement neither grows nor shrinks.
const STAGNATION: i64 = 40;

/// A town or city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settlement {
    /// Controlling faction
    pub owner: String,
    /// Inhabitants
    pub population: u32,
    /// Wealth and contentment (0-100)
    pub prosperity: i32,
    /// Walls and garrison (0-100)
    pub defense: i32,
}

impl Default for Settlement {
    fn default() -> Self {
        Self {
            owner: String::new(),
            population: 100,
            prosperity: 50,
            defense: 20,
        }
    }
}

impl Settlement {
    /// Creates a settlement.
    #[must_use]
    pub fn new(owner: &str, population: u32, prosperity: i32, defense: i32) -> Self {
        Self {
            owner: owner.to_string(),
            population,
            prosperity: prosperity.clamp(0, MAX_RATING),
            defense: defense.clamp(0, MAX_RATING),
        }
    }

    /// Monthly population change at the current prosperity.
    #[must_use]
    pub fn growth(&self) -> i64 {
        let prosperity = i64::from(self.prosperity.clamp(0, MAX_RATING));
        i64::from(self.population) * (prosperity - STAGNATION) / 1000
    }
}

/// All settlements by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettlementState {
    /// Settlements by name
    pub settlements: BTreeMap<String, Settlement>,
}

impl SettlementState {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settlement names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.settlements.keys().cloned().collect()
    }

    /// Looks up a settlement.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Settlement> {
        self.settlements.get(name)
    }

    /// Damage from war or disaster: `amount` percent of the population,
    /// `amount` prosperity and half as much defense.
    pub fn damage(&mut self, name: &str, amount: u32) {
        let amount = amount.min(100);
        let settlement = self.settlements.entry(name.to_string()).or_default();
        let lost = u64::from(settlement.population) * u64::from(amount) / 100;
        settlement.population = settlement
            .population
            .saturating_sub(u32::try_from(lost).unwrap_or(u32::MAX));
        let amount = amount as i32;
        settlement.prosperity = settlement.prosperity.saturating_sub(amount).clamp(0, MAX_RATING);
        settlement.defense = settlement.defense.saturating_sub(amount / 2).clamp(0, MAX_RATING);
    }

    /// Hands a settlement to a new owner.
    pub fn set_owner(&mut self, name: &str, owner: &str) {
        self.settlements.entry(name.to_string()).or_default().owner = owner.to_string();
    }

    /// Shifts prosperity. Returns the new value.
    pub fn adjust_prosperity(&mut self, name: &str, delta: i32) -> i32 {
        let settlement = self.settlements.entry(name.to_string()).or_default();
        settlement.prosperity = settlement
            .prosperity
            .saturating_add(delta)
            .clamp(0, MAX_RATING);
        settlement.prosperity
    }

    /// Monthly growth (or decline) by prosperity.
    pub fn monthly_growth(&mut self) {
        for settlement in self.settlements.values_mut() {
            let population = i64::from(settlement.population)
                .saturating_add(settlement.growth())
                .max(0);
            settlement.population = u32::try_from(population).unwrap_or(u32::MAX);
        }
    }
}

impl Subsystem for SettlementState {
    fn name(&self) -> &'static str {
        "settlements"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for settlement in self.settlements.values_mut() {
            settlement.prosperity = settlement.prosperity.clamp(0, MAX_RATING);
            settlement.defense = settlement.defense.clamp(0, MAX_RATING);
        }
        if !self.settlements.is_empty() {
            return;
        }
        let seeds = [
            ("Ashford", Settlement::new("Kingdom of Valmere", 1200, 60, 40)),
            ("Brightwater", Settlement::new("Free Cities", 3400, 70, 30)),
            ("Karst Hold", Settlement::new("Iron Pact", 900, 45, 70)),
            ("Dawnspire", Settlement::new("Order of the Dawn", 600, 55, 50)),
            ("Millbrook", Settlement::new("Kingdom of Valmere", 400, 50, 15)),
        ];
        for (name, settlement) in seeds {
            self.settlements.insert(name.to_string(), settlement);
        }
    }

    fn tick(&mut self, cadence: Cadence, _ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Monthly {
            self.monthly_growth();
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.settlements.is_empty() {
            return "No settlements".to_string();
        }
        self.settlements
            .iter()
            .map(|(name, s)| {
                format!(
                    "{name} ({}, pop {}, prosperity {}, defense {})",
                    s.owner, s.population, s.prosperity, s.defense
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::ScriptedRandom;

    fn realm() -> SettlementState {
        let mut settlements = SettlementState::new();
        settlements.init(&mut ScriptedRandom::default());
        settlements
    }

    #[test]
    fn test_seeded_names_are_sorted() {
        assert_eq!(
            realm().names(),
            vec!["Ashford", "Brightwater", "Dawnspire", "Karst Hold", "Millbrook"]
        );
    }

    #[test]
    fn test_damage() {
        let mut settlements = realm();
        settlements.damage("Ashford", 10);
        let ashford = settlements.get("Ashford").expect("settlement");
        assert_eq!(ashford.population, 1080);
        assert_eq!(ashford.prosperity, 50);
        assert_eq!(ashford.defense, 35);

        settlements.damage("Millbrook", 500);
        let millbrook = settlements.get("Millbrook").expect("settlement");
        assert_eq!(millbrook.population, 0);
        assert_eq!(millbrook.prosperity, 0);
        assert_eq!(millbrook.defense, 0);
    }

    #[test]
    fn test_set_owner_and_prosperity() {
        let mut settlements = realm();
        settlements.set_owner("Ashford", "Iron Pact");
        assert_eq!(settlements.get("Ashford").expect("settlement").owner, "Iron Pact");
        assert_eq!(settlements.adjust_prosperity("Ashford", 90), 100);
        assert_eq!(settlements.adjust_prosperity("Nowhere", -90), 0);
    }

    #[test]
    fn test_monthly_growth_follows_prosperity() {
        let mut settlements = realm();
        settlements.monthly_growth();
        // 1200 * (60 - 40) / 1000 = 24
        assert_eq!(settlements.get("Ashford").expect("settlement").population, 1224);
        // 900 * (45 - 40) / 1000 = 4
        assert_eq!(settlements.get("Karst Hold").expect("settlement").population, 904);

        settlements.adjust_prosperity("Millbrook", -50);
        settlements.monthly_growth();
        // 404 * (0 - 40) / 1000 = -16
        assert_eq!(settlements.get("Millbrook").expect("settlement").population, 388);
    }

    #[test]
    fn test_loaded_ratings_are_clamped() {
        let mut settlements = SettlementState::new();
        settlements.settlements.insert(
            "Ashford".to_string(),
            Settlement {
                owner: "Kingdom of Valmere".to_string(),
                population: u32::MAX,
                prosperity: i32::MIN,
                defense: i32::MAX,
            },
        );
        settlements.init(&mut ScriptedRandom::default());
        let ashford = settlements.get("Ashford").expect("settlement");
        assert_eq!(ashford.prosperity, 0);
        assert_eq!(ashford.defense, MAX_RATING);
        assert_eq!(settlements.names(), vec!["Ashford"]);

        settlements.monthly_growth();
        settlements.damage("Ashford", 10);
        assert_eq!(settlements.get("Ashford").expect("settlement").prosperity, 0);
    }
}
