//! Subsystem contract shared by every world slice.
//!
//! Each slice of the world state implements [`Subsystem`]. The scheduler
//! calls `tick` on each registered slice for every boundary crossed, in a
//! fixed order, and routes the returned signals to other slices.

use saga_common::RandomSource;

use crate::calendar::{CalendarDate, Season};
use crate::signal::WorldSignal;
use crate::weather::{ClimateZone, WeatherKind};

/// How often a tick hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Once per day crossed.
    Daily,
    /// When the day entered is a multiple of seven.
    Weekly,
    /// When the day entered is the first of a month.
    Monthly,
}

impl Cadence {
    /// Get the display name of this cadence.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Read-only facts plus the random source handed to a tick.
pub struct TickContext<'a> {
    /// Date just entered.
    pub date: CalendarDate,
    /// Active climate zone.
    pub climate: ClimateZone,
    /// Weather as of the most recent weather tick.
    pub weather: WeatherKind,
    /// Known settlement names, for subsystems that move things around.
    pub locations: &'a [String],
    /// Random source for this tick.
    pub rng: &'a mut dyn RandomSource,
}

impl TickContext<'_> {
    /// Season of the date being ticked.
    #[must_use]
    pub fn season(&self) -> Season {
        self.date.season()
    }

    /// Pick a random known location.
    pub fn random_location(&mut self) -> Option<String> {
        if self.locations.is_empty() {
            return None;
        }
        let idx = self.rng.index(self.locations.len());
        self.locations.get(idx).cloned()
    }
}

impl std::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickContext")
            .field("date", &self.date)
            .field("climate", &self.climate)
            .field("weather", &self.weather)
            .field("locations", &self.locations)
            .finish_non_exhaustive()
    }
}

/// The contract every world slice fulfills.
pub trait Subsystem {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Seed default rows when the slice is empty. Safe to call every session.
    fn init(&mut self, rng: &mut dyn RandomSource) {
        let _ = rng;
    }

    /// Periodic update. Returns signals for the scheduler to route.
    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        let _ = (cadence, ctx);
        Vec::new()
    }

    /// Deterministic one-line rendering of the slice.
    fn summary(&self) -> String;
}
