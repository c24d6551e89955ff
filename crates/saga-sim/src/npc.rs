//! Named NPCs living their own lives.
//!
//! Every day each NPC may travel to one of their haunts, and picks an
//! activity from what their role does.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Daily chance an NPC moves.
const TRAVEL_CHANCE: f64 = 0.2;
/// Disposition bounds.
pub const MAX_DISPOSITION: i32 = 100;

/// Error types for roster operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NpcError {
    /// NPC not found
    #[error("NPC not found: {0}")]
    NotFound(String),
    /// NPC already on the roster
    #[error("NPC already registered: {0}")]
    AlreadyRegistered(String),
}

/// Result type for roster operations.
pub type NpcResult<T> = Result<T, NpcError>;

/// What an NPC does for a living.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NpcRole {
    /// Runs an inn
    Innkeeper,
    /// Sells a sword
    Mercenary,
    /// Serves a temple
    Priest,
    /// Takes what isn't theirs
    Thief,
    /// Buys and sells
    #[default]
    Merchant,
    /// Keeps the peace
    Guard,
}

impl NpcRole {
    /// Things this role does on an ordinary day.
    #[must_use]
    pub const fn activities(self) -> &'static [&'static str] {
        match self {
            Self::Innkeeper => &["pouring ale", "chasing out a drunk", "counting coin"],
            Self::Mercenary => &[
                "drilling recruits",
                "haggling over a contract",
                "sharpening a blade",
            ],
            Self::Priest => &["tending the sick", "leading vespers", "reading omens"],
            Self::Thief => &[
                "casing a merchant's house",
                "fencing stolen goods",
                "lying low",
            ],
            Self::Merchant => &["minding the stall", "checking a shipment", "bribing a clerk"],
            Self::Guard => &["walking the walls", "questioning travelers", "dicing in the barracks"],
        }
    }

    /// Get the display name of this role.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Innkeeper => "innkeeper",
            Self::Mercenary => "mercenary",
            Self::Priest => "priest",
            Self::Thief => "thief",
            Self::Merchant => "merchant",
            Self::Guard => "guard",
        }
    }
}

/// A named NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Npc {
    /// Occupation
    pub role: NpcRole,
    /// Where they are now
    pub location: String,
    /// Places they frequent
    pub haunts: Vec<String>,
    /// What they are doing today
    pub activity: String,
    /// Attitude toward the party (-100 to 100)
    pub disposition: i32,
}

impl Default for Npc {
    fn default() -> Self {
        Self::new(NpcRole::default(), "")
    }
}

impl Npc {
    /// Creates an NPC who haunts only their starting location.
    #[must_use]
    pub fn new(role: NpcRole, location: &str) -> Self {
        Self {
            role,
            location: location.to_string(),
            haunts: vec![location.to_string()],
            activity: role.activities()[0].to_string(),
            disposition: 0,
        }
    }

    /// Sets the places this NPC frequents.
    #[must_use]
    pub fn with_haunts(mut self, haunts: &[&str]) -> Self {
        self.haunts = haunts.iter().map(|h| (*h).to_string()).collect();
        self
    }
}

/// The roster of named NPCs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcState {
    /// NPCs by name
    pub npcs: BTreeMap<String, Npc>,
}

impl NpcState {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an NPC.
    pub fn add_npc(&mut self, name: &str, npc: Npc) -> NpcResult<()> {
        if self.npcs.contains_key(name) {
            return Err(NpcError::AlreadyRegistered(name.to_string()));
        }
        self.npcs.insert(name.to_string(), npc);
        Ok(())
    }

    /// Removes an NPC from the roster.
    pub fn remove_npc(&mut self, name: &str) -> NpcResult<Npc> {
        self.npcs
            .remove(name)
            .ok_or_else(|| NpcError::NotFound(name.to_string()))
    }

    /// Shifts an NPC's disposition toward the party. Returns the new value.
    pub fn adjust_disposition(&mut self, name: &str, delta: i32) -> NpcResult<i32> {
        let npc = self
            .npcs
            .get_mut(name)
            .ok_or_else(|| NpcError::NotFound(name.to_string()))?;
        npc.disposition = npc
            .disposition
            .saturating_add(delta)
            .clamp(-MAX_DISPOSITION, MAX_DISPOSITION);
        Ok(npc.disposition)
    }

    /// NPCs currently at a location.
    pub fn at(&self, location: &str) -> impl Iterator<Item = (&String, &Npc)> {
        let location = location.to_string();
        self.npcs.iter().filter(move |(_, npc)| npc.location == location)
    }

    /// One day passes for everyone on the roster.
    pub fn daily_update(&mut self, rng: &mut dyn RandomSource) {
        for (name, npc) in &mut self.npcs {
            if rng.chance(TRAVEL_CHANCE) && !npc.haunts.is_empty() {
                let destination = npc.haunts[rng.index(npc.haunts.len())].clone();
                if destination != npc.location {
                    tracing::debug!("{name} travels from {} to {destination}", npc.location);
                    npc.location = destination;
                }
            }
            let activities = npc.role.activities();
            npc.activity = activities[rng.index(activities.len())].to_string();
        }
    }
}

impl Subsystem for NpcState {
    fn name(&self) -> &'static str {
        "npcs"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        if !self.npcs.is_empty() {
            return;
        }
        let seeds = [
            ("Mirela Voss", Npc::new(NpcRole::Innkeeper, "Ashford")),
            (
                "Harlan Dree",
                Npc::new(NpcRole::Mercenary, "Karst Hold").with_haunts(&[
                    "Karst Hold",
                    "Ashford",
                    "Millbrook",
                ]),
            ),
            (
                "Sister Ysolde",
                Npc::new(NpcRole::Priest, "Dawnspire").with_haunts(&["Dawnspire", "Brightwater"]),
            ),
            (
                "Pell the Quick",
                Npc::new(NpcRole::Thief, "Brightwater").with_haunts(&["Brightwater", "Ashford"]),
            ),
        ];
        for (name, npc) in seeds {
            self.npcs.insert(name.to_string(), npc);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Daily {
            self.daily_update(ctx.rng);
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.npcs.is_empty() {
            return "No notable folk".to_string();
        }
        self.npcs
            .iter()
            .map(|(name, npc)| {
                format!(
                    "{name} the {} in {}, {}",
                    npc.role.display_name(),
                    npc.location,
                    npc.activity
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
