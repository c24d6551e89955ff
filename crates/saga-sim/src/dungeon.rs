//! Dungeons that open up around the world.

use serde::{Deserialize, Serialize};

use saga_common::RandomSource;

use crate::calendar::CalendarDate;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Monthly chance a new dungeon emerges.
const EMERGENCE_CHANCE: f64 = 0.3;
/// No new dungeons while this many remain uncleared.
pub const MAX_UNCLEARED: usize = 5;

const ADJECTIVES: [&str; 6] = ["Sunken", "Weeping", "Hollow", "Ashen", "Forgotten", "Drowned"];
const NOUNS: [&str; 6] = ["Crypt", "Warren", "Vault", "Barrow", "Spire", "Catacombs"];

/// A dungeon site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dungeon {
    /// Name of the site
    pub name: String,
    /// Nearest settlement
    pub region: String,
    /// 1 (a cellar of rats) to 5 (certain death)
    pub danger: u8,
    /// Whether adventurers have cleared it
    pub cleared: bool,
    /// When it was first reported
    pub discovered: CalendarDate,
}

/// Known dungeons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DungeonState {
    /// Every dungeon ever found
    pub dungeons: Vec<Dungeon>,
}

impl DungeonState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dungeons still waiting to be cleared.
    pub fn uncleared(&self) -> impl Iterator<Item = &Dungeon> {
        self.dungeons.iter().filter(|d| !d.cleared)
    }

    /// Records a dungeon. Danger is clamped to `1..=5`.
    pub fn add_dungeon(&mut self, name: &str, region: &str, danger: u8, date: CalendarDate) {
        self.dungeons.push(Dungeon {
            name: name.to_string(),
            region: region.to_string(),
            danger: danger.clamp(1, 5),
            cleared: false,
            discovered: date,
        });
    }

    /// Marks a dungeon cleared. Returns `false` if no uncleared dungeon has
    /// that name.
    pub fn clear_dungeon(&mut self, name: &str) -> bool {
        match self.dungeons.iter_mut().find(|d| d.name == name && !d.cleared) {
            Some(dungeon) => {
                dungeon.cleared = true;
                true
            },
            None => false,
        }
    }

    /// Monthly emergence roll.
    pub fn emerge(&mut self, ctx: &mut TickContext<'_>) -> Option<Dungeon> {
        if self.uncleared().count() >= MAX_UNCLEARED || !ctx.rng.chance(EMERGENCE_CHANCE) {
            return None;
        }
        let region = ctx.random_location()?;
        let name = format!(
            "The {} {}",
            ADJECTIVES[ctx.rng.index(ADJECTIVES.len())],
            NOUNS[ctx.rng.index(NOUNS.len())]
        );
        let danger = ctx.rng.range_i64(1, 6) as u8;
        self.add_dungeon(&name, &region, danger, ctx.date);
        self.dungeons.last().cloned()
    }
}

impl Subsystem for DungeonState {
    fn name(&self) -> &'static str {
        "dungeons"
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Monthly {
            return Vec::new();
        }
        self.emerge(ctx)
            .map(|d| WorldSignal::DungeonEmerged {
                name: d.name,
                region: d.region,
            })
            .into_iter()
            .collect()
    }

    fn summary(&self) -> String {
        let open: Vec<String> = self
            .uncleared()
            .map(|d| format!("{} near {} (danger {})", d.name, d.region, d.danger))
            .collect();
        if open.is_empty() {
            "No known dungeons".to_string()
        } else {
            open.join("; ")
        }
    }
}
