//! Weather generation for the world map.
//!
//! This module provides daily weather that affects travel and combat:
//! - Seasonal base weights per weather kind
//! - Climate zone deltas layered on top of the seasonal table
//! - A fixed effects table for visibility, travel speed, and combat

use serde::{Deserialize, Serialize};

use saga_common::{weighted_index, RandomSource};

use crate::calendar::Season;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Weather kinds in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherKind {
    /// Clear skies, normal conditions.
    #[default]
    Clear,
    /// Overcast.
    Cloudy,
    /// Steady rain, muddy roads.
    Rain,
    /// Thunderstorm with heavy wind.
    Storm,
    /// Thick fog, poor visibility.
    Fog,
    /// Snowfall.
    Snow,
    /// Snowstorm, travel nearly impossible.
    Blizzard,
    /// Oppressive heat.
    Heatwave,
}

impl WeatherKind {
    /// Number of weather kinds.
    pub const COUNT: usize = 8;

    /// Get all weather kinds, in table order.
    #[must_use]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Clear,
            Self::Cloudy,
            Self::Rain,
            Self::Storm,
            Self::Fog,
            Self::Snow,
            Self::Blizzard,
            Self::Heatwave,
        ]
    }

    /// Get the display name for this weather kind.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Storm => "Storm",
            Self::Fog => "Fog",
            Self::Snow => "Snow",
            Self::Blizzard => "Blizzard",
            Self::Heatwave => "Heatwave",
        }
    }

    /// Check if this weather is harsh enough to keep people indoors.
    #[must_use]
    pub fn is_severe(self) -> bool {
        matches!(self, Self::Storm | Self::Blizzard | Self::Heatwave)
    }

    /// Effects table entry for this kind.
    #[must_use]
    pub const fn effects(self) -> WeatherEffects {
        let (visibility, travel_speed, combat_mod) = match self {
            Self::Clear => (1.0, 1.0, 0),
            Self::Cloudy => (0.85, 1.0, 0),
            Self::Rain => (0.7, 0.8, -1),
            Self::Storm => (0.4, 0.5, -3),
            Self::Fog => (0.25, 0.75, -2),
            Self::Snow => (0.6, 0.6, -2),
            Self::Blizzard => (0.15, 0.3, -4),
            Self::Heatwave => (0.9, 0.7, -1),
        };
        WeatherEffects {
            visibility,
            travel_speed,
            combat_mod,
        }
    }
}

/// Derived modifiers for a weather kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherEffects {
    /// Visibility (0.0 - 1.0)
    pub visibility: f64,
    /// Travel speed multiplier (0.0 - 1.0)
    pub travel_speed: f64,
    /// Flat combat modifier
    pub combat_mod: i32,
}

/// Climate zones, each shifting the seasonal weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClimateZone {
    /// Mild four-season climate (no adjustment).
    #[default]
    Temperate,
    /// Cold north.
    Arctic,
    /// Dry and hot.
    Desert,
    /// Wet and warm.
    Tropical,
    /// Foggy, stormy shores.
    Coastal,
}

impl ClimateZone {
    /// Weight deltas per weather kind, in [`WeatherKind::all`] order.
    #[must_use]
    pub const fn modifiers(self) -> [i32; WeatherKind::COUNT] {
        match self {
            Self::Temperate => [0, 0, 0, 0, 0, 0, 0, 0],
            Self::Arctic => [-10, 0, -10, 0, 0, 20, 15, -20],
            Self::Desert => [25, -10, -15, -5, -10, -20, -10, 20],
            Self::Tropical => [0, 0, 15, 10, 5, -30, -20, 5],
            Self::Coastal => [-5, 5, 5, 8, 15, -5, -5, -5],
        }
    }

    /// Get the display name for this zone.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Temperate => "Temperate",
            Self::Arctic => "Arctic",
            Self::Desert => "Desert",
            Self::Tropical => "Tropical",
            Self::Coastal => "Coastal",
        }
    }
}

/// Base weights per weather kind for a season.
#[must_use]
pub const fn season_weights(season: Season) -> [u32; WeatherKind::COUNT] {
    match season {
        // [Clear, Cloudy, Rain, Storm, Fog, Snow, Blizzard, Heatwave]
        Season::Spring => [30, 25, 25, 8, 10, 2, 0, 0],
        Season::Summer => [40, 20, 12, 12, 4, 0, 0, 12],
        Season::Autumn => [25, 28, 22, 8, 14, 3, 0, 0],
        Season::Winter => [20, 25, 8, 4, 10, 23, 10, 0],
    }
}

/// Seasonal weights with climate deltas applied, clamped to zero.
#[must_use]
pub fn effective_weights(season: Season, zone: ClimateZone) -> [u32; WeatherKind::COUNT] {
    let base = season_weights(season);
    let deltas = zone.modifiers();
    let mut weights = [0u32; WeatherKind::COUNT];
    for (idx, weight) in weights.iter_mut().enumerate() {
        *weight = (base[idx] as i32 + deltas[idx]).max(0) as u32;
    }
    weights
}

/// Current weather and its derived modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherState {
    /// Current weather kind.
    pub current: WeatherKind,
    /// Visibility (0.0 - 1.0)
    pub visibility: f64,
    /// Travel speed multiplier (0.0 - 1.0)
    pub travel_speed: f64,
    /// Flat combat modifier
    pub combat_mod: i32,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::from_kind(WeatherKind::Clear)
    }
}

impl WeatherState {
    /// Weather state for a kind, with its modifiers filled in.
    #[must_use]
    pub const fn from_kind(kind: WeatherKind) -> Self {
        let effects = kind.effects();
        Self {
            current: kind,
            visibility: effects.visibility,
            travel_speed: effects.travel_speed,
            combat_mod: effects.combat_mod,
        }
    }

    /// Draw fresh weather for a season and climate zone.
    pub fn generate(season: Season, zone: ClimateZone, rng: &mut dyn RandomSource) -> Self {
        let weights = effective_weights(season, zone);
        let kind = WeatherKind::all()[weighted_index(&weights, rng)];
        Self::from_kind(kind)
    }

    /// Replace the current weather with a fresh draw.
    pub fn regenerate(&mut self, season: Season, zone: ClimateZone, rng: &mut dyn RandomSource) {
        *self = Self::generate(season, zone, rng);
    }

    /// Force a specific weather kind.
    pub fn set_weather(&mut self, kind: WeatherKind) {
        *self = Self::from_kind(kind);
    }

    /// Re-derive modifiers from `current`.
    pub fn sync_effects(&mut self) {
        *self = Self::from_kind(self.current);
    }
}

/// Likelihood of each weather kind for a season and zone, most likely first.
#[must_use]
pub fn forecast(season: Season, zone: ClimateZone) -> Vec<(WeatherKind, f64)> {
    let weights = effective_weights(season, zone);
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return vec![(WeatherKind::Clear, 1.0)];
    }

    let mut likely: Vec<_> = WeatherKind::all()
        .iter()
        .zip(weights.iter())
        .filter(|(_, &w)| w > 0)
        .map(|(&kind, &w)| (kind, f64::from(w) / f64::from(total)))
        .collect();

    // Sort by probability descending
    likely.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    likely
}

impl Subsystem for WeatherState {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        self.sync_effects();
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Daily {
            self.regenerate(ctx.season(), ctx.climate, ctx.rng);
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        format!(
            "{} (visibility {:.0}%, travel {:.0}%, combat {:+})",
            self.current.display_name(),
            self.visibility * 100.0,
            self.travel_speed * 100.0,
            self.combat_mod
        )
    }
}
