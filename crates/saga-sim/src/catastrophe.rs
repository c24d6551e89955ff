//! Natural disasters.
//!
//! A weekly roll may strike a random settlement with a catastrophe whose kind
//! is drawn from season-weighted odds. Active catastrophes count down daily.

use serde::{Deserialize, Serialize};

use saga_common::{weighted_index, RandomSource};

use crate::calendar::{CalendarDate, Season};
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Weekly chance of a catastrophe.
const WEEKLY_CHANCE: f64 = 0.05;
/// Severity range, upper bound exclusive.
const SEVERITY_RANGE: (i64, i64) = (1, 6);
/// Duration range in days, upper bound exclusive.
const DURATION_RANGE: (i64, i64) = (3, 10);
/// Highest severity.
pub const MAX_SEVERITY: u8 = 5;

/// Kind of catastrophe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CatastropheKind {
    /// Rivers burst their banks
    Flood,
    /// Fields and forests burn
    Wildfire,
    /// The ground shakes
    Earthquake,
    /// Disease sweeps through
    Pestilence,
    /// No rain for weeks
    Drought,
    /// Mountain snow comes down
    Avalanche,
}

impl CatastropheKind {
    /// Number of kinds.
    pub const COUNT: usize = 6;

    /// All kinds in weight-table order.
    #[must_use]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Flood,
            Self::Wildfire,
            Self::Earthquake,
            Self::Pestilence,
            Self::Drought,
            Self::Avalanche,
        ]
    }

    /// Get the display name of this kind.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Flood => "Flood",
            Self::Wildfire => "Wildfire",
            Self::Earthquake => "Earthquake",
            Self::Pestilence => "Pestilence",
            Self::Drought => "Drought",
            Self::Avalanche => "Avalanche",
        }
    }

    /// Fractional price shock applied to markets while this kind strikes,
    /// scaled per point of severity.
    #[must_use]
    pub const fn price_impact_per_severity(self) -> f64 {
        match self {
            Self::Flood | Self::Drought => 0.04,
            Self::Wildfire | Self::Pestilence => 0.03,
            Self::Earthquake | Self::Avalanche => 0.02,
        }
    }
}

/// Relative odds of each kind by season, in [`CatastropheKind::all`] order.
#[must_use]
pub const fn catastrophe_weights(season: Season) -> [u32; CatastropheKind::COUNT] {
    match season {
        Season::Spring => [40, 5, 10, 20, 0, 25],
        Season::Summer => [10, 40, 10, 10, 30, 0],
        Season::Autumn => [25, 10, 10, 40, 10, 5],
        Season::Winter => [5, 0, 10, 30, 0, 55],
    }
}

/// A catastrophe instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catastrophe {
    /// Unique id within this world
    pub id: u64,
    /// What happened
    pub kind: CatastropheKind,
    /// Where it happened
    pub settlement: String,
    /// 1 (minor) to 5 (devastating)
    pub severity: u8,
    /// Days left
    pub remaining: i32,
    /// Date it struck
    pub started: CalendarDate,
}

/// Active and past catastrophes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatastropheState {
    /// Ongoing catastrophes
    pub active: Vec<Catastrophe>,
    /// Every catastrophe that ever struck
    pub history: Vec<Catastrophe>,
    /// Next id to hand out
    pub next_id: u64,
}

impl CatastropheState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Strike a settlement. Severity is clamped to `1..=5`.
    pub fn trigger(
        &mut self,
        kind: CatastropheKind,
        settlement: &str,
        severity: u8,
        duration: u32,
        date: CalendarDate,
    ) -> Catastrophe {
        self.next_id = self.next_id.saturating_add(1);
        let catastrophe = Catastrophe {
            id: self.next_id,
            kind,
            settlement: settlement.to_string(),
            severity: severity.clamp(1, MAX_SEVERITY),
            remaining: duration.min(i32::MAX as u32) as i32,
            started: date,
        };
        self.active.push(catastrophe.clone());
        self.history.push(catastrophe.clone());
        catastrophe
    }

    /// Weekly roll. Returns the new catastrophe when one strikes.
    pub fn roll_weekly(&mut self, ctx: &mut TickContext<'_>) -> Option<Catastrophe> {
        if !ctx.rng.chance(WEEKLY_CHANCE) {
            return None;
        }
        let kind = CatastropheKind::all()[weighted_index(&catastrophe_weights(ctx.season()), ctx.rng)];
        let settlement = ctx.random_location()?;
        let severity = ctx.rng.range_i64(SEVERITY_RANGE.0, SEVERITY_RANGE.1) as u8;
        let duration = ctx.rng.range_i64(DURATION_RANGE.0, DURATION_RANGE.1) as u32;
        Some(self.trigger(kind, &settlement, severity, duration, ctx.date))
    }

    /// Count active catastrophes down by a day; returns the ones that ended.
    pub fn tick_daily(&mut self) -> Vec<Catastrophe> {
        for catastrophe in &mut self.active {
            catastrophe.remaining = catastrophe.remaining.saturating_sub(1);
        }
        let (ended, ongoing): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|c| c.remaining <= 0);
        self.active = ongoing;
        ended
    }

    /// Whether a settlement is currently suffering a catastrophe.
    #[must_use]
    pub fn is_stricken(&self, settlement: &str) -> bool {
        self.active.iter().any(|c| c.settlement == settlement)
    }
}

impl Subsystem for CatastropheState {
    fn name(&self) -> &'static str {
        "catastrophes"
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        match cadence {
            Cadence::Daily => {
                for ended in self.tick_daily() {
                    tracing::debug!("{} at {} has passed", ended.kind.display_name(), ended.settlement);
                }
                Vec::new()
            },
            Cadence::Weekly => self
                .roll_weekly(ctx)
                .map(|c| WorldSignal::CatastropheStruck {
                    kind: c.kind,
                    settlement: c.settlement,
                    severity: c.severity,
                })
                .into_iter()
                .collect(),
            Cadence::Monthly => Vec::new(),
        }
    }

    fn summary(&self) -> String {
        if self.active.is_empty() {
            return "The land is quiet".to_string();
        }
        self.active
            .iter()
            .map(|c| {
                format!(
                    "{} at {} (severity {}, {} days left)",
                    c.kind.display_name(),
                    c.settlement,
                    c.severity,
                    c.remaining
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
