//! # Saga Sim
//!
//! World simulation systems for Project Saga.
//!
//! This crate provides every slice of the simulated world and the rules that
//! move it forward:
//! - Calendar (30-day months, seasons, festivals)
//! - Weighted weather generation per season and climate zone
//! - Factions, economy, events and rumors
//! - Wars, dynasties, tensions and settlements
//! - Dungeons, catastrophes, crime, prophecies and divine favor
//! - Civilians, named NPCs and party reputation
//! - The [`WorldState`] aggregate and the [`Subsystem`] contract

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod calendar;
pub mod catastrophe;
pub mod civilian;
pub mod crime;
pub mod divine;
pub mod dungeon;
pub mod dynasty;
pub mod economy;
pub mod events;
pub mod faction;
pub mod npc;
pub mod prophecy;
pub mod reputation;
pub mod rumors;
pub mod settlement;
pub mod signal;
pub mod state;
pub mod subsystem;
pub mod tension;
pub mod war;
pub mod weather;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::calendar::*;
    pub use crate::catastrophe::*;
    pub use crate::civilian::*;
    pub use crate::crime::*;
    pub use crate::divine::*;
    pub use crate::dungeon::*;
    pub use crate::dynasty::*;
    pub use crate::economy::*;
    pub use crate::events::*;
    pub use crate::faction::*;
    pub use crate::npc::*;
    pub use crate::prophecy::*;
    pub use crate::reputation::*;
    pub use crate::rumors::*;
    pub use crate::settlement::*;
    pub use crate::signal::*;
    pub use crate::state::*;
    pub use crate::subsystem::*;
    pub use crate::tension::*;
    pub use crate::war::*;
    pub use crate::weather::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::ScriptedRandom;

    #[test]
    fn test_seeded_world_summaries_are_stable() {
        let mut world = WorldState::new();
        world.init_all(&mut ScriptedRandom::default());
        for key in SubsystemKey::ALL {
            let subsystem = world.subsystem(key);
            assert_eq!(subsystem.summary(), subsystem.summary());
            assert!(!subsystem.summary().is_empty());
        }
    }

    #[test]
    fn test_seeded_factions_match_settlement_owners() {
        let mut world = WorldState::new();
        world.init_all(&mut ScriptedRandom::default());
        let factions = world.factions.names();
        for settlement in world.settlements.settlements.values() {
            assert!(factions.contains(&settlement.owner), "{}", settlement.owner);
        }
    }
}
