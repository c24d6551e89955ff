//! The persisted world document.
//!
//! [`WorldState`] is the root aggregate: one slice per subsystem plus `meta`.
//! Unknown top-level keys found in storage are kept in `extra` and written
//! back untouched.

use serde::{Deserialize, Serialize};

use saga_common::{RandomSource, SchemaVersion};

use crate::calendar::TimeState;
use crate::catastrophe::CatastropheState;
use crate::civilian::CivilianState;
use crate::crime::CrimeState;
use crate::divine::DivineState;
use crate::dungeon::DungeonState;
use crate::dynasty::DynastyState;
use crate::economy::EconomyState;
use crate::events::EventState;
use crate::faction::FactionState;
use crate::npc::NpcState;
use crate::prophecy::ProphecyState;
use crate::reputation::ReputationState;
use crate::rumors::RumorState;
use crate::settlement::SettlementState;
use crate::subsystem::Subsystem;
use crate::tension::TensionState;
use crate::war::WarState;
use crate::weather::WeatherState;

/// Document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldMeta {
    /// Unix seconds of the last save
    pub last_updated: u64,
    /// Schema the document was written with
    pub schema: SchemaVersion,
}

/// Names every slice of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsystemKey {
    /// Calendar
    Time,
    /// Weather
    Weather,
    /// Faction relations
    Factions,
    /// Market prices
    Economy,
    /// World events
    Events,
    /// Rumors
    Rumors,
    /// Wars
    Wars,
    /// Noble houses
    Dynasties,
    /// Dungeons
    Dungeons,
    /// Civilian mood
    Civilians,
    /// Cold-war tensions
    Tensions,
    /// Divine favor
    Divine,
    /// Crime
    Crime,
    /// Catastrophes
    Catastrophes,
    /// Prophecies
    Prophecies,
    /// Party renown
    Reputation,
    /// Settlements
    Settlements,
    /// NPC roster
    Npcs,
}

impl SubsystemKey {
    /// Every slice, in document order.
    pub const ALL: [Self; 18] = [
        Self::Time,
        Self::Weather,
        Self::Factions,
        Self::Economy,
        Self::Events,
        Self::Rumors,
        Self::Wars,
        Self::Dynasties,
        Self::Dungeons,
        Self::Civilians,
        Self::Tensions,
        Self::Divine,
        Self::Crime,
        Self::Catastrophes,
        Self::Prophecies,
        Self::Reputation,
        Self::Settlements,
        Self::Npcs,
    ];

    /// Top-level key in the persisted document.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Weather => "weather",
            Self::Factions => "factions",
            Self::Economy => "economy",
            Self::Events => "events",
            Self::Rumors => "rumors",
            Self::Wars => "wars",
            Self::Dynasties => "dynasties",
            Self::Dungeons => "dungeons",
            Self::Civilians => "civilians",
            Self::Tensions => "tensions",
            Self::Divine => "divine",
            Self::Crime => "crime",
            Self::Catastrophes => "catastrophes",
            Self::Prophecies => "prophecies",
            Self::Reputation => "reputation",
            Self::Settlements => "settlements",
            Self::Npcs => "npcs",
        }
    }

    /// Bracket tag used in the world context.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Time => "Date",
            Self::Weather => "Weather",
            Self::Factions => "Factions",
            Self::Economy => "Economy",
            Self::Events => "Events",
            Self::Rumors => "Rumors",
            Self::Wars => "Wars",
            Self::Dynasties => "Dynasties",
            Self::Dungeons => "Dungeons",
            Self::Civilians => "Civilians",
            Self::Tensions => "Tensions",
            Self::Divine => "Divine",
            Self::Crime => "Crime",
            Self::Catastrophes => "Catastrophes",
            Self::Prophecies => "Prophecies",
            Self::Reputation => "Reputation",
            Self::Settlements => "Settlements",
            Self::Npcs => "NPCs",
        }
    }

    /// Parses a document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// The whole simulated world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldState {
    /// Calendar
    pub time: TimeState,
    /// Current weather
    pub weather: WeatherState,
    /// Faction relations and reputation
    pub factions: FactionState,
    /// Market prices
    pub economy: EconomyState,
    /// World events
    pub events: EventState,
    /// Circulating rumors
    pub rumors: RumorState,
    /// Wars
    pub wars: WarState,
    /// Noble houses
    pub dynasties: DynastyState,
    /// Dungeons
    pub dungeons: DungeonState,
    /// Civilian mood
    pub civilians: CivilianState,
    /// Cold-war tensions
    pub tensions: TensionState,
    /// Divine favor
    pub divine: DivineState,
    /// Crime
    pub crime: CrimeState,
    /// Catastrophes
    pub catastrophes: CatastropheState,
    /// Prophecies
    pub prophecies: ProphecyState,
    /// Party renown
    pub reputation: ReputationState,
    /// Settlements
    pub settlements: SettlementState,
    /// NPC roster
    pub npcs: NpcState,
    /// Document metadata
    pub meta: WorldMeta,
    /// Top-level keys this build does not know about
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WorldState {
    /// Creates the canonical default world (empty slices, epoch date).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The slice behind `key`.
    #[must_use]
    pub fn subsystem(&self, key: SubsystemKey) -> &dyn Subsystem {
        match key {
            SubsystemKey::Time => &self.time,
            SubsystemKey::Weather => &self.weather,
            SubsystemKey::Factions => &self.factions,
            SubsystemKey::Economy => &self.economy,
            SubsystemKey::Events => &self.events,
            SubsystemKey::Rumors => &self.rumors,
            SubsystemKey::Wars => &self.wars,
            SubsystemKey::Dynasties => &self.dynasties,
            SubsystemKey::Dungeons => &self.dungeons,
            SubsystemKey::Civilians => &self.civilians,
            SubsystemKey::Tensions => &self.tensions,
            SubsystemKey::Divine => &self.divine,
            SubsystemKey::Crime => &self.crime,
            SubsystemKey::Catastrophes => &self.catastrophes,
            SubsystemKey::Prophecies => &self.prophecies,
            SubsystemKey::Reputation => &self.reputation,
            SubsystemKey::Settlements => &self.settlements,
            SubsystemKey::Npcs => &self.npcs,
        }
    }

    /// The slice behind `key`, mutably.
    pub fn subsystem_mut(&mut self, key: SubsystemKey) -> &mut dyn Subsystem {
        match key {
            SubsystemKey::Time => &mut self.time,
            SubsystemKey::Weather => &mut self.weather,
            SubsystemKey::Factions => &mut self.factions,
            SubsystemKey::Economy => &mut self.economy,
            SubsystemKey::Events => &mut self.events,
            SubsystemKey::Rumors => &mut self.rumors,
            SubsystemKey::Wars => &mut self.wars,
            SubsystemKey::Dynasties => &mut self.dynasties,
            SubsystemKey::Dungeons => &mut self.dungeons,
            SubsystemKey::Civilians => &mut self.civilians,
            SubsystemKey::Tensions => &mut self.tensions,
            SubsystemKey::Divine => &mut self.divine,
            SubsystemKey::Crime => &mut self.crime,
            SubsystemKey::Catastrophes => &mut self.catastrophes,
            SubsystemKey::Prophecies => &mut self.prophecies,
            SubsystemKey::Reputation => &mut self.reputation,
            SubsystemKey::Settlements => &mut self.settlements,
            SubsystemKey::Npcs => &mut self.npcs,
        }
    }

    /// Seeds every empty slice. Safe to call on every load.
    pub fn init_all(&mut self, rng: &mut dyn RandomSource) {
        for key in SubsystemKey::ALL {
            self.subsystem_mut(key).init(rng);
        }
    }

    /// Settlement names, used as the places things happen.
    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.settlements.names()
    }
}
