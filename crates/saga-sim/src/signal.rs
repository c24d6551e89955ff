//! Signals passed between subsystems through the scheduler.
//!
//! A subsystem never touches another slice. When its tick produces something
//! another slice cares about, it returns a [`WorldSignal`] and the scheduler
//! hands it to the receiving slice's public methods.

use serde::{Deserialize, Serialize};

use crate::catastrophe::CatastropheKind;
use crate::events::WorldEvent;

/// Cross-subsystem notifications produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldSignal {
    /// A world event began.
    EventStarted(WorldEvent),
    /// A cold-war tension crossed its breaking point.
    TensionBoiledOver {
        /// First party
        a: String,
        /// Second party
        b: String,
    },
    /// A battle was fought.
    BattleFought {
        /// War identifier
        war_id: u64,
        /// Attacking faction
        attacker: String,
        /// Defending faction
        defender: String,
    },
    /// A war reached exhaustion and ended.
    WarEnded {
        /// Attacking faction
        attacker: String,
        /// Defending faction
        defender: String,
    },
    /// A siege succeeded.
    SettlementCaptured {
        /// Settlement name
        settlement: String,
        /// New owner
        captor: String,
    },
    /// A catastrophe struck a settlement.
    CatastropheStruck {
        /// Kind of catastrophe
        kind: CatastropheKind,
        /// Settlement hit
        settlement: String,
        /// Severity (1-5)
        severity: u8,
    },
    /// A new dungeon opened.
    DungeonEmerged {
        /// Dungeon name
        name: String,
        /// Where it appeared
        region: String,
    },
    /// A ruling house changed hands.
    Succession {
        /// House name
        house: String,
        /// The new ruler
        ruler: String,
    },
    /// A prophecy came true.
    ProphecyFulfilled {
        /// Prophecy text
        text: String,
        /// Deity credited with it
        patron: String,
    },
    /// Crime in a settlement spiked.
    CrimeWave {
        /// Settlement name
        settlement: String,
    },
}

impl WorldSignal {
    /// Short description suitable for seeding a rumor.
    #[must_use]
    pub fn headline(&self) -> String {
        match self {
            Self::EventStarted(event) => format!("{} has begun", event.name),
            Self::TensionBoiledOver { a, b } => format!("{a} and {b} are at each other's throats"),
            Self::BattleFought {
                attacker, defender, ..
            } => format!("soldiers of {attacker} clashed with {defender}"),
            Self::WarEnded { attacker, defender } => {
                format!("the war between {attacker} and {defender} is over")
            },
            Self::SettlementCaptured { settlement, captor } => {
                format!("{settlement} has fallen to {captor}")
            },
            Self::CatastropheStruck {
                kind, settlement, ..
            } => format!("a {} struck {settlement}", kind.display_name().to_lowercase()),
            Self::DungeonEmerged { name, region } => format!("{name} was seen near {region}"),
            Self::Succession { house, ruler } => format!("{ruler} now rules {house}"),
            Self::ProphecyFulfilled { text, .. } => format!("the prophecy came true: {text}"),
            Self::CrimeWave { settlement } => format!("thieves run wild in {settlement}"),
        }
    }

    /// Where the news starts, if the signal has a natural origin.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        match self {
            Self::SettlementCaptured { settlement, .. }
            | Self::CatastropheStruck { settlement, .. }
            | Self::CrimeWave { settlement } => Some(settlement),
            Self::DungeonEmerged { region, .. } => Some(region),
            _ => None,
        }
    }
}
