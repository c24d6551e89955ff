//! Market prices for trade goods.
//!
//! Prices wander by a small random amount every day and are pulled toward a
//! seasonal target. World events shock them through [`EconomyState::apply_event_modifier`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::calendar::Season;
use crate::events::WorldEvent;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Largest daily random drift, as a fraction of the price.
const DAILY_VOLATILITY: f64 = 0.05;
/// Fraction of the gap to the seasonal target closed per day.
const SEASONAL_PULL: f64 = 0.1;
/// No good ever trades below this.
pub const MIN_PRICE: u32 = 1;

/// Seed goods: name, base price, seasonal factors (spring, summer, autumn, winter).
const SEED_GOODS: [(&str, u32, [f64; 4]); 8] = [
    ("grain", 10, [1.1, 0.9, 0.7, 1.4]),
    ("ale", 4, [1.0, 1.2, 0.9, 1.1]),
    ("iron", 25, [1.0, 1.0, 1.0, 1.0]),
    ("timber", 8, [0.9, 0.9, 1.0, 1.3]),
    ("cloth", 15, [1.0, 0.9, 1.0, 1.2]),
    ("salt", 6, [1.0, 1.1, 1.2, 1.0]),
    ("horses", 120, [0.9, 1.0, 1.0, 1.2]),
    ("spices", 40, [1.0, 0.95, 1.0, 1.1]),
];

/// A tradable good's price record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Good {
    /// Current market price
    pub price: u32,
    /// Price the market returns to absent pressure
    pub base: u32,
    /// Seasonal multipliers on `base`, indexed by [`Season::index`]
    pub seasonal: [f64; 4],
}

impl Default for Good {
    fn default() -> Self {
        Self::new(MIN_PRICE)
    }
}

impl Good {
    /// Creates a good with a flat seasonal profile.
    #[must_use]
    pub fn new(base: u32) -> Self {
        let base = base.max(MIN_PRICE);
        Self {
            price: base,
            base,
            seasonal: [1.0; 4],
        }
    }

    /// Sets the seasonal profile.
    #[must_use]
    pub fn with_seasonal(mut self, seasonal: [f64; 4]) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Target price in the given season.
    #[must_use]
    pub fn seasonal_target(&self, season: Season) -> f64 {
        f64::from(self.base) * self.seasonal[season.index()]
    }
}

fn to_price(value: f64) -> u32 {
    if !value.is_finite() {
        return MIN_PRICE;
    }
    (value.round().clamp(f64::from(MIN_PRICE), f64::from(u32::MAX))) as u32
}

/// Prices of every known good.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomyState {
    /// Goods by name
    pub goods: BTreeMap<String, Good>,
}

impl EconomyState {
    /// Creates an empty market.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current price of a good.
    #[must_use]
    pub fn price(&self, good: &str) -> Option<u32> {
        self.goods.get(good).map(|g| g.price)
    }

    /// Sets a price, creating the good (with that base) if unknown.
    pub fn set_price(&mut self, good: &str, price: u32) {
        let price = price.max(MIN_PRICE);
        self.goods
            .entry(good.to_string())
            .or_insert_with(|| Good::new(price))
            .price = price;
    }

    /// Random daily drift of up to ±5% plus a flat `modifier`.
    pub fn adjust_prices(&mut self, modifier: f64, rng: &mut dyn RandomSource) {
        for good in self.goods.values_mut() {
            let drift = rng.range_f64(-DAILY_VOLATILITY, DAILY_VOLATILITY);
            let price = f64::from(good.price);
            good.price = to_price(price + price * drift + modifier);
        }
    }

    /// Moves every price 10% of the way toward its seasonal target.
    pub fn apply_seasonal_modifier(&mut self, season: Season) {
        for good in self.goods.values_mut() {
            let price = f64::from(good.price);
            let target = good.seasonal_target(season);
            good.price = to_price(price + (target - price) * SEASONAL_PULL);
        }
    }

    /// Multiplies every price by `1 + event.price_impact`.
    pub fn apply_event_modifier(&mut self, event: &WorldEvent) {
        self.apply_shock(event.price_impact);
    }

    /// Multiplies every price by `1 + impact`.
    pub fn apply_shock(&mut self, impact: f64) {
        for good in self.goods.values_mut() {
            good.price = to_price(f64::from(good.price) * (1.0 + impact));
        }
    }
}

impl Subsystem for EconomyState {
    fn name(&self) -> &'static str {
        "economy"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        if !self.goods.is_empty() {
            return;
        }
        for (name, base, seasonal) in SEED_GOODS {
            self.goods
                .insert(name.to_string(), Good::new(base).with_seasonal(seasonal));
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Daily {
            self.adjust_prices(0.0, ctx.rng);
            self.apply_seasonal_modifier(ctx.season());
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.goods.is_empty() {
            return "Markets are empty".to_string();
        }
        self.goods
            .iter()
            .map(|(name, good)| format!("{name} {}g", good.price))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
