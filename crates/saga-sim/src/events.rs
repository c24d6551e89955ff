//! World events with a limited lifetime.
//!
//! Events are rolled weekly from a template table, count down daily, and
//! leave `active` when they expire. `history` is append-only.

use serde::{Deserialize, Serialize};

use saga_common::RandomSource;

use crate::calendar::CalendarDate;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Roll at or above this value to start a weekly event.
const WEEKLY_EVENT_THRESHOLD: f64 = 0.6;
/// Shortest generated event, in days.
const MIN_DURATION: i64 = 7;
/// Generated events last strictly less than this many days.
const MAX_DURATION: i64 = 14;

/// Broad category of a world event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Celebration
    Festival,
    /// Food shortage
    Famine,
    /// Disease outbreak
    Plague,
    /// Raiders on the roads
    Banditry,
    /// Martial contest
    Tournament,
    /// Merchant windfall
    TradeBoom,
    /// People on the move
    Migration,
    /// Anything entered by hand
    #[default]
    Custom,
}

/// Static description of an event that can be rolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTemplate {
    /// Event name
    pub name: &'static str,
    /// Event category
    pub kind: EventKind,
    /// Flavor text
    pub description: &'static str,
    /// Fractional price change applied to goods while the event begins
    pub price_impact: f64,
}

/// Templates for weekly events.
pub const EVENT_TEMPLATES: [EventTemplate; 7] = [
    EventTemplate {
        name: "Grain Blight",
        kind: EventKind::Famine,
        description: "A blight withers the fields; bread grows dear.",
        price_impact: 0.15,
    },
    EventTemplate {
        name: "Tournament of Banners",
        kind: EventKind::Tournament,
        description: "Knights gather to joust for renown.",
        price_impact: 0.03,
    },
    EventTemplate {
        name: "Red Cough",
        kind: EventKind::Plague,
        description: "A wet cough spreads through the lower wards.",
        price_impact: 0.08,
    },
    EventTemplate {
        name: "Highway Raiders",
        kind: EventKind::Banditry,
        description: "Caravans are waylaid on the king's road.",
        price_impact: 0.1,
    },
    EventTemplate {
        name: "Merchant Fleet Arrives",
        kind: EventKind::TradeBoom,
        description: "Foreign ships unload silk and spice at the docks.",
        price_impact: -0.1,
    },
    EventTemplate {
        name: "Lantern Festival",
        kind: EventKind::Festival,
        description: "Paper lanterns float over the rivers at dusk.",
        price_impact: 0.02,
    },
    EventTemplate {
        name: "Refugee Columns",
        kind: EventKind::Migration,
        description: "Displaced families crowd the roads seeking shelter.",
        price_impact: 0.05,
    },
];

/// A world event instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldEvent {
    /// Unique id within this world
    pub id: u64,
    /// Event name
    pub name: String,
    /// Event category
    pub kind: EventKind,
    /// Flavor text
    pub description: String,
    /// Total length in days
    pub duration: u32,
    /// Days left; removed from `active` at zero
    pub remaining: i32,
    /// Date the event began
    pub started: CalendarDate,
    /// Fractional price change for the economy
    pub price_impact: f64,
}

/// Active and past world events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventState {
    /// Events currently running
    pub active: Vec<WorldEvent>,
    /// Every event ever started (append-only)
    pub history: Vec<WorldEvent>,
    /// Next id to hand out
    pub next_id: u64,
    /// Total events created
    pub created_total: u64,
}

impl EventState {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an event from a template.
    pub fn create_event(
        &mut self,
        template: &EventTemplate,
        duration: u32,
        date: CalendarDate,
    ) -> WorldEvent {
        self.start(
            template.name,
            template.kind,
            template.description,
            template.price_impact,
            duration,
            date,
        )
    }

    /// Start a hand-written event.
    pub fn create_custom(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        duration: u32,
        date: CalendarDate,
    ) -> WorldEvent {
        self.start(name, EventKind::Custom, description, 0.0, duration, date)
    }

    fn start(
        &mut self,
        name: impl Into<String>,
        kind: EventKind,
        description: impl Into<String>,
        price_impact: f64,
        duration: u32,
        date: CalendarDate,
    ) -> WorldEvent {
        self.next_id = self.next_id.saturating_add(1);
        self.created_total = self.created_total.saturating_add(1);
        let event = WorldEvent {
            id: self.next_id,
            name: name.into(),
            kind,
            description: description.into(),
            duration,
            remaining: duration.min(i32::MAX as u32) as i32,
            started: date,
            price_impact,
        };
        self.active.push(event.clone());
        self.history.push(event.clone());
        event
    }

    /// Weekly roll: maybe start a random templated event.
    pub fn generate_weekly(
        &mut self,
        date: CalendarDate,
        rng: &mut dyn RandomSource,
    ) -> Option<WorldEvent> {
        if rng.next_f64() < WEEKLY_EVENT_THRESHOLD {
            return None;
        }
        let template = EVENT_TEMPLATES[rng.index(EVENT_TEMPLATES.len())];
        let duration = rng.range_i64(MIN_DURATION, MAX_DURATION) as u32;
        Some(self.create_event(&template, duration, date))
    }

    /// Count every active event down by a day; returns the ones that expired.
    pub fn tick_daily(&mut self) -> Vec<WorldEvent> {
        for event in &mut self.active {
            event.remaining = event.remaining.saturating_sub(1);
        }
        let (expired, still_active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|event| event.remaining <= 0);
        self.active = still_active;
        expired
    }

    /// End an event early. Returns `false` when no such event is active.
    pub fn end_event(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|event| event.id != id);
        self.active.len() != before
    }

    /// Whether an event with this id is running.
    #[must_use]
    pub fn is_active(&self, id: u64) -> bool {
        self.active.iter().any(|event| event.id == id)
    }
}

impl Subsystem for EventState {
    fn name(&self) -> &'static str {
        "events"
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        match cadence {
            Cadence::Daily => {
                for event in self.tick_daily() {
                    tracing::debug!("Event ended: {}", event.name);
                }
                Vec::new()
            },
            Cadence::Weekly => self
                .generate_weekly(ctx.date, ctx.rng)
                .map(WorldSignal::EventStarted)
                .into_iter()
                .collect(),
            Cadence::Monthly => Vec::new(),
        }
    }

    fn summary(&self) -> String {
        if self.active.is_empty() {
            return "No notable events".to_string();
        }
        self.active
            .iter()
            .map(|event| format!("{} ({} days left)", event.name, event.remaining))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
