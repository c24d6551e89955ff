//! The party's renown: fame, infamy, regional standing and titles.
//!
//! Fame and infamy fade by a point a week. Regional standing and titles persist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Highest fame or infamy.
pub const MAX_RENOWN: i32 = 100;
/// Regional standing bounds.
pub const MAX_REGIONAL_STANDING: i32 = 100;
/// Fame and infamy lost every week.
const WEEKLY_FADE: i32 = 1;

/// Party renown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReputationState {
    /// Good deeds remembered (0-100)
    pub fame: i32,
    /// Bad deeds remembered (0-100)
    pub infamy: i32,
    /// Standing (-100 to 100) by region
    pub regions: BTreeMap<String, i32>,
    /// Titles earned, in the order granted
    pub titles: Vec<String>,
}

impl ReputationState {
    /// Creates a party nobody has heard of.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds fame. Returns the new value.
    pub fn adjust_fame(&mut self, delta: i32) -> i32 {
        self.fame = self.fame.saturating_add(delta).clamp(0, MAX_RENOWN);
        self.fame
    }

    /// Adds infamy. Returns the new value.
    pub fn adjust_infamy(&mut self, delta: i32) -> i32 {
        self.infamy = self.infamy.saturating_add(delta).clamp(0, MAX_RENOWN);
        self.infamy
    }

    /// Standing in a region (0 when unknown).
    #[must_use]
    pub fn standing(&self, region: &str) -> i32 {
        self.regions.get(region).copied().unwrap_or(0)
    }

    /// Shifts standing in a region. Returns the new value.
    pub fn adjust_standing(&mut self, region: &str, delta: i32) -> i32 {
        let standing = self.regions.entry(region.to_string()).or_insert(0);
        *standing = standing
            .saturating_add(delta)
            .clamp(-MAX_REGIONAL_STANDING, MAX_REGIONAL_STANDING);
        *standing
    }

    /// Grants a title. Returns `false` if the party already holds it.
    pub fn grant_title(&mut self, title: &str) -> bool {
        if self.titles.iter().any(|t| t == title) {
            return false;
        }
        self.titles.push(title.to_string());
        true
    }

    /// Strips a title. Returns `false` if the party did not hold it.
    pub fn revoke_title(&mut self, title: &str) -> bool {
        let before = self.titles.len();
        self.titles.retain(|t| t != title);
        self.titles.len() != before
    }

    /// Fame and infamy fade a little.
    pub fn weekly_fade(&mut self) {
        self.fame = self.fame.saturating_sub(WEEKLY_FADE).clamp(0, MAX_RENOWN);
        self.infamy = self.infamy.saturating_sub(WEEKLY_FADE).clamp(0, MAX_RENOWN);
    }
}

impl Subsystem for ReputationState {
    fn name(&self) -> &'static str {
        "reputation"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        self.fame = self.fame.clamp(0, MAX_RENOWN);
        self.infamy = self.infamy.clamp(0, MAX_RENOWN);
        for standing in self.regions.values_mut() {
            *standing = (*standing).clamp(-MAX_REGIONAL_STANDING, MAX_REGIONAL_STANDING);
        }
    }

    fn tick(&mut self, cadence: Cadence, _ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Weekly {
            self.weekly_fade();
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        let mut out = format!("Fame {}, infamy {}", self.fame, self.infamy);
        if !self.titles.is_empty() {
            out.push_str(&format!("; titles: {}", self.titles.join(", ")));
        }
        if !self.regions.is_empty() {
            let standing = self
                .regions
                .iter()
                .map(|(region, value)| format!("{region} {value:+}"))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("; standing: {standing}"));
        }
        out
    }
}
