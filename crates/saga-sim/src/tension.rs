//! Cold-war tensions between pairs of factions.
//!
//! Tension is symmetric: `(a, b)` and `(b, a)` name the same pair. When a
//! pair reaches [`BOILING_POINT`] it boils over once, and stays quiet until
//! someone eases it.

use serde::{Deserialize, Serialize};

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Level at which a tension boils over into open conflict.
pub const BOILING_POINT: i32 = 90;
/// Highest tension.
pub const MAX_TENSION: i32 = 100;
/// Weekly random drift, upper bound exclusive.
const WEEKLY_DRIFT: (i64, i64) = (-3, 6);

/// Tension between two factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tension {
    /// First party (lexically smaller)
    pub a: String,
    /// Second party
    pub b: String,
    /// 0 (at ease) to 100 (on the brink)
    pub level: i32,
    /// Set once the pair has boiled over, cleared by easing
    pub boiled_over: bool,
}

impl Tension {
    /// Describes the level in words.
    #[must_use]
    pub fn mood(&self) -> &'static str {
        match self.level {
            ..=29 => "calm",
            30..=59 => "uneasy",
            60..=89 => "simmering",
            _ => "boiling",
        }
    }
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// All tracked tensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TensionState {
    /// Tracked pairs
    pub pairs: Vec<Tension>,
}

impl TensionState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level between two factions (0 when untracked).
    #[must_use]
    pub fn level(&self, a: &str, b: &str) -> i32 {
        let (a, b) = ordered(a, b);
        self.pairs
            .iter()
            .find(|t| t.a == a && t.b == b)
            .map_or(0, |t| t.level)
    }

    fn pair_mut(&mut self, a: &str, b: &str) -> &mut Tension {
        let (a, b) = ordered(a, b);
        let pos = match self.pairs.iter().position(|t| t.a == a && t.b == b) {
            Some(pos) => pos,
            None => {
                self.pairs.push(Tension {
                    a: a.to_string(),
                    b: b.to_string(),
                    level: 0,
                    boiled_over: false,
                });
                self.pairs.len() - 1
            },
        };
        &mut self.pairs[pos]
    }

    /// Raises tension. Returns the new level.
    pub fn raise(&mut self, a: &str, b: &str, amount: i32) -> i32 {
        let pair = self.pair_mut(a, b);
        pair.level = pair.level.saturating_add(amount).clamp(0, MAX_TENSION);
        pair.level
    }

    /// Lowers tension and re-arms the boil-over. Returns the new level.
    pub fn ease(&mut self, a: &str, b: &str, amount: i32) -> i32 {
        let pair = self.pair_mut(a, b);
        pair.level = pair.level.saturating_sub(amount).clamp(0, MAX_TENSION);
        pair.boiled_over = false;
        pair.level
    }

    /// Random weekly drift, then boil-over checks. Returns the pairs that
    /// boiled over this week.
    pub fn weekly_drift(&mut self, rng: &mut dyn RandomSource) -> Vec<(String, String)> {
        let mut boiled = Vec::new();
        for pair in &mut self.pairs {
            let drift = rng.range_i64(WEEKLY_DRIFT.0, WEEKLY_DRIFT.1) as i32;
            pair.level = pair.level.saturating_add(drift).clamp(0, MAX_TENSION);
            if pair.level >= BOILING_POINT && !pair.boiled_over {
                pair.boiled_over = true;
                boiled.push((pair.a.clone(), pair.b.clone()));
            }
        }
        boiled
    }
}

impl Subsystem for TensionState {
    fn name(&self) -> &'static str {
        "tensions"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for pair in &mut self.pairs {
            pair.level = pair.level.clamp(0, MAX_TENSION);
        }
        if self.pairs.is_empty() {
            self.raise("Iron Pact", "Kingdom of Valmere", 60);
            self.raise("Free Cities", "Iron Pact", 35);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Weekly {
            return Vec::new();
        }
        self.weekly_drift(ctx.rng)
            .into_iter()
            .map(|(a, b)| WorldSignal::TensionBoiledOver { a, b })
            .collect()
    }

    fn summary(&self) -> String {
        if self.pairs.is_empty() {
            return "No rivalries".to_string();
        }
        self.pairs
            .iter()
            .map(|t| format!("{} / {}: {} ({})", t.a, t.b, t.level, t.mood()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
