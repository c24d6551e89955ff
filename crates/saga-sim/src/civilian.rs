//! Common folk: mood and daily doings per settlement.
//!
//! Mood drifts back toward a neutral 50 every day and sours under bad
//! weather. The activity label is re-rolled daily from the mood band.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};
use crate::weather::WeatherKind;

/// Mood the populace settles back to.
pub const NEUTRAL_MOOD: i32 = 50;
/// Highest mood.
pub const MAX_MOOD: i32 = 100;

const GLUM: [&str; 3] = [
    "grumbling in the taverns",
    "hoarding bread",
    "muttering about the crown",
];
const STEADY: [&str; 3] = [
    "going about their trades",
    "haggling at market",
    "mending fences",
];
const MERRY: [&str; 3] = [
    "dancing in the square",
    "feasting late into the night",
    "singing in the streets",
];
const SHELTERING: &str = "sheltering indoors";

/// Mood lost per day to the given weather.
#[must_use]
pub const fn weather_penalty(kind: WeatherKind) -> i32 {
    match kind {
        WeatherKind::Storm | WeatherKind::Blizzard | WeatherKind::Heatwave => 2,
        WeatherKind::Rain | WeatherKind::Snow | WeatherKind::Fog => 1,
        WeatherKind::Clear | WeatherKind::Cloudy => 0,
    }
}

/// The common folk of one settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Populace {
    /// Contentment (0-100)
    pub mood: i32,
    /// What people are up to today
    pub activity: String,
}

impl Default for Populace {
    fn default() -> Self {
        Self {
            mood: NEUTRAL_MOOD,
            activity: STEADY[0].to_string(),
        }
    }
}

/// Civilian mood by settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CivilianState {
    /// Populace by settlement name
    pub settlements: BTreeMap<String, Populace>,
}

impl CivilianState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mood in a settlement (neutral when unknown).
    #[must_use]
    pub fn mood(&self, settlement: &str) -> i32 {
        self.settlements
            .get(settlement)
            .map_or(NEUTRAL_MOOD, |p| p.mood)
    }

    /// Shifts mood in a settlement. Returns the new value.
    pub fn adjust_mood(&mut self, settlement: &str, delta: i32) -> i32 {
        let populace = self.settlements.entry(settlement.to_string()).or_default();
        populace.mood = populace.mood.saturating_add(delta).clamp(0, MAX_MOOD);
        populace.mood
    }

    /// One day passes: drift toward neutral, weather penalty, new activity.
    pub fn daily_update(&mut self, weather: WeatherKind, rng: &mut dyn RandomSource) {
        let penalty = weather_penalty(weather);
        for populace in self.settlements.values_mut() {
            let toward_neutral = match populace.mood.cmp(&NEUTRAL_MOOD) {
                Ordering::Greater => -1,
                Ordering::Less => 1,
                Ordering::Equal => 0,
            };
            populace.mood = populace
                .mood
                .saturating_add(toward_neutral)
                .saturating_sub(penalty)
                .clamp(0, MAX_MOOD);
            populace.activity = if weather.is_severe() {
                SHELTERING.to_string()
            } else {
                let band: &[&str] = match populace.mood {
                    ..=29 => &GLUM,
                    30..=69 => &STEADY,
                    _ => &MERRY,
                };
                band[rng.index(band.len())].to_string()
            };
        }
    }
}

impl Subsystem for CivilianState {
    fn name(&self) -> &'static str {
        "civilians"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for populace in self.settlements.values_mut() {
            populace.mood = populace.mood.clamp(0, MAX_MOOD);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Daily {
            for location in ctx.locations {
                self.settlements.entry(location.clone()).or_default();
            }
            self.daily_update(ctx.weather, ctx.rng);
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.settlements.is_empty() {
            return "No townsfolk to speak of".to_string();
        }
        self.settlements
            .iter()
            .map(|(name, p)| format!("{name}: {} (mood {})", p.activity, p.mood))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
