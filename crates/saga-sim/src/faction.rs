//! Faction relations and reputation.
//!
//! Relations are directional: how A feels about B is tracked separately from
//! how B feels about A. All values are clamped to [-100, 100] and unknown
//! faction names are created on first mutation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Lowest relation or reputation value.
pub const MIN_STANDING: i32 = -100;
/// Highest relation or reputation value.
pub const MAX_STANDING: i32 = 100;

/// Relations at or below this value show up in the summary.
const HOSTILE_SUMMARY_THRESHOLD: i32 = -25;

/// Seed factions and their starting opinions of each other.
const SEED_RELATIONS: [(&str, &str, i32); 7] = [
    ("Kingdom of Valmere", "Iron Pact", -30),
    ("Iron Pact", "Kingdom of Valmere", -25),
    ("Kingdom of Valmere", "Free Cities", 20),
    ("Free Cities", "Kingdom of Valmere", 10),
    ("Order of the Dawn", "Kingdom of Valmere", 40),
    ("Iron Pact", "Free Cities", -10),
    ("Free Cities", "Order of the Dawn", 5),
];

/// Reputation standing levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReputationStanding {
    /// Hostile (-100 to -50)
    Hostile,
    /// Unfriendly (-49 to -10)
    Unfriendly,
    /// Neutral (-9 to 9)
    Neutral,
    /// Friendly (10 to 49)
    Friendly,
    /// Allied (50 to 100)
    Allied,
}

impl ReputationStanding {
    /// Converts a reputation value to a standing.
    #[must_use]
    pub const fn from_value(value: i32) -> Self {
        match value {
            ..=-50 => Self::Hostile,
            -49..=-10 => Self::Unfriendly,
            -9..=9 => Self::Neutral,
            10..=49 => Self::Friendly,
            50.. => Self::Allied,
        }
    }

    /// Get the display name of this standing.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Hostile => "Hostile",
            Self::Unfriendly => "Unfriendly",
            Self::Neutral => "Neutral",
            Self::Friendly => "Friendly",
            Self::Allied => "Allied",
        }
    }

    /// Checks if this standing is hostile.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Hostile | Self::Unfriendly)
    }
}

/// Relation matrix and per-faction reputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactionState {
    /// `relations[a][b]`: how `a` regards `b`
    pub relations: BTreeMap<String, BTreeMap<String, i32>>,
    /// Party reputation with each faction
    pub reputation: BTreeMap<String, i32>,
}

impl FactionState {
    /// Creates an empty faction table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a faction with zero reputation if it is not known yet.
    pub fn add_faction(&mut self, name: &str) {
        self.reputation.entry(name.to_string()).or_insert(0);
        self.relations.entry(name.to_string()).or_default();
    }

    /// All known faction names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .reputation
            .keys()
            .chain(self.relations.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// How `a` regards `b` (0 when unknown).
    #[must_use]
    pub fn relation(&self, a: &str, b: &str) -> i32 {
        self.relations
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Shift how `a` regards `b`. Returns the new value.
    pub fn adjust_relation(&mut self, a: &str, b: &str, delta: i32) -> i32 {
        let current = self.relation(a, b);
        self.set_relation(a, b, current.saturating_add(delta))
    }

    /// Set how `a` regards `b`. Returns the stored (clamped) value.
    pub fn set_relation(&mut self, a: &str, b: &str, value: i32) -> i32 {
        self.add_faction(a);
        self.add_faction(b);
        let value = value.clamp(MIN_STANDING, MAX_STANDING);
        self.relations
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), value);
        value
    }

    /// Reputation with a faction (0 when unknown).
    #[must_use]
    pub fn reputation(&self, faction: &str) -> i32 {
        self.reputation.get(faction).copied().unwrap_or(0)
    }

    /// Standing with a faction.
    #[must_use]
    pub fn standing(&self, faction: &str) -> ReputationStanding {
        ReputationStanding::from_value(self.reputation(faction))
    }

    /// Modifies reputation with a faction. Returns the new value.
    pub fn adjust_reputation(&mut self, faction: &str, delta: i32) -> i32 {
        self.add_faction(faction);
        let value = self
            .reputation(faction)
            .saturating_add(delta)
            .clamp(MIN_STANDING, MAX_STANDING);
        self.reputation.insert(faction.to_string(), value);
        value
    }

    /// Moves every relation one step toward zero.
    pub fn weekly_drift(&mut self) {
        for value in self.relations.values_mut().flat_map(BTreeMap::values_mut) {
            match (*value).cmp(&0) {
                Ordering::Greater => *value -= 1,
                Ordering::Less => *value += 1,
                Ordering::Equal => {},
            }
        }
    }
}

impl Subsystem for FactionState {
    fn name(&self) -> &'static str {
        "factions"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for value in self
            .relations
            .values_mut()
            .flat_map(BTreeMap::values_mut)
            .chain(self.reputation.values_mut())
        {
            *value = (*value).clamp(MIN_STANDING, MAX_STANDING);
        }
        if !self.reputation.is_empty() || !self.relations.is_empty() {
            return;
        }
        for (a, b, value) in SEED_RELATIONS {
            self.set_relation(a, b, value);
        }
    }

    fn tick(&mut self, cadence: Cadence, _ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Weekly {
            self.weekly_drift();
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.reputation.is_empty() {
            return "No known factions".to_string();
        }
        let standings = self
            .reputation
            .iter()
            .map(|(name, &rep)| {
                format!(
                    "{name} ({}, {rep:+})",
                    ReputationStanding::from_value(rep).display_name()
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        let hostile: Vec<String> = self
            .relations
            .iter()
            .flat_map(|(a, row)| {
                row.iter()
                    .filter(|(_, &v)| v <= HOSTILE_SUMMARY_THRESHOLD)
                    .map(move |(b, v)| format!("{a} -> {b} {v}"))
            })
            .collect();

        if hostile.is_empty() {
            standings
        } else {
            format!("{standings}. Hostility: {}", hostile.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::ScriptedRandom;

    #[test]
    fn test_reputation_standing() {
        assert_eq!(
            ReputationStanding::from_value(-100),
            ReputationStanding::Hostile
        );
        assert_eq!(
            ReputationStanding::from_value(-49),
            ReputationStanding::Unfriendly
        );
        assert_eq!(
            ReputationStanding::from_value(0),
            ReputationStanding::Neutral
        );
        assert_eq!(
            ReputationStanding::from_value(25),
            ReputationStanding::Friendly
        );
        assert_eq!(
            ReputationStanding::from_value(75),
            ReputationStanding::Allied
        );
        assert!(ReputationStanding::from_value(-30).is_hostile());
        assert!(!ReputationStanding::from_value(0).is_hostile());
    }

    #[test]
    fn test_reputation_clamping() {
        let mut factions = FactionState::new();

        assert_eq!(factions.adjust_reputation("Iron Pact", 1000), 100);
        assert_eq!(factions.reputation("Iron Pact"), 100);

        assert_eq!(factions.adjust_reputation("Iron Pact", -1000), -100);
        assert_eq!(factions.reputation("Iron Pact"), -100);
    }

    #[test]
    fn test_extreme_deltas_do_not_overflow() {
        let mut factions = FactionState::new();
        assert_eq!(factions.adjust_reputation("A", i32::MAX), 100);
        assert_eq!(factions.adjust_relation("A", "B", i32::MIN), -100);
    }

    #[test]
    fn test_relations_are_directional() {
        let mut factions = FactionState::new();
        factions.adjust_relation("A", "B", -40);
        assert_eq!(factions.relation("A", "B"), -40);
        assert_eq!(factions.relation("B", "A"), 0);
    }

    #[test]
    fn test_unknown_factions_are_created_lazily() {
        let mut factions = FactionState::new();
        assert_eq!(factions.relation("Ghost", "Other"), 0);
        assert!(factions.names().is_empty());

        factions.adjust_relation("Ghost", "Other", 5);
        assert_eq!(factions.names(), vec!["Ghost".to_string(), "Other".to_string()]);
        assert_eq!(factions.reputation("Ghost"), 0);
    }

    #[test]
    fn test_weekly_drift_moves_toward_zero() {
        let mut factions = FactionState::new();
        factions.set_relation("A", "B", 10);
        factions.set_relation("B", "A", -10);
        factions.set_relation("A", "C", 0);

        factions.weekly_drift();

        assert_eq!(factions.relation("A", "B"), 9);
        assert_eq!(factions.relation("B", "A"), -9);
        assert_eq!(factions.relation("A", "C"), 0);
    }

    #[test]
    fn test_init_seeds_only_when_empty() {
        let mut factions = FactionState::new();
        factions.init(&mut ScriptedRandom::default());
        assert_eq!(factions.relation("Kingdom of Valmere", "Iron Pact"), -30);

        factions.adjust_relation("Kingdom of Valmere", "Iron Pact", 50);
        factions.init(&mut ScriptedRandom::default());
        assert_eq!(factions.relation("Kingdom of Valmere", "Iron Pact"), 20);
    }

    #[test]
    fn test_summary_lists_hostility() {
        let mut factions = FactionState::new();
        factions.adjust_reputation("A", 60);
        factions.set_relation("B", "A", -30);
        assert_eq!(
            factions.summary(),
            "A (Allied, +60); B (Neutral, +0). Hostility: B -> A -30"
        );
    }
}
