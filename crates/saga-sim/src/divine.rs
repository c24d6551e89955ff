//! Favor of the gods.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Favor bounds.
pub const MAX_FAVOR: i32 = 100;
/// Favor lost (toward zero) every month.
const MONTHLY_DECAY: i32 = 2;

const PANTHEON: [(&str, i32); 4] = [
    ("Solara", 10),
    ("Morvath", 0),
    ("Thalassa", 5),
    ("The Weaver", 0),
];

/// How a god regards the world, in words.
#[must_use]
pub fn disposition(favor: i32) -> &'static str {
    match favor {
        ..=-50 => "wrathful",
        -49..=-11 => "displeased",
        -10..=10 => "indifferent",
        11..=49 => "pleased",
        _ => "exalted",
    }
}

/// Favor by deity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DivineState {
    /// Favor (-100 to 100) by deity name
    pub favor: BTreeMap<String, i32>,
}

impl DivineState {
    /// Creates an empty pantheon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current favor of a deity (0 when unknown).
    #[must_use]
    pub fn favor(&self, deity: &str) -> i32 {
        self.favor.get(deity).copied().unwrap_or(0)
    }

    /// Shifts a deity's favor. Returns the new value.
    pub fn adjust_favor(&mut self, deity: &str, delta: i32) -> i32 {
        let favor = self.favor.entry(deity.to_string()).or_insert(0);
        *favor = favor.saturating_add(delta).clamp(-MAX_FAVOR, MAX_FAVOR);
        *favor
    }

    /// Every deity's favor slides 2 toward zero.
    pub fn monthly_decay(&mut self) {
        for favor in self.favor.values_mut() {
            *favor -= (*favor).clamp(-MONTHLY_DECAY, MONTHLY_DECAY);
        }
    }
}

impl Subsystem for DivineState {
    fn name(&self) -> &'static str {
        "divine"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for favor in self.favor.values_mut() {
            *favor = (*favor).clamp(-MAX_FAVOR, MAX_FAVOR);
        }
        if self.favor.is_empty() {
            for (deity, favor) in PANTHEON {
                self.favor.insert(deity.to_string(), favor);
            }
        }
    }

    fn tick(&mut self, cadence: Cadence, _ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence == Cadence::Monthly {
            self.monthly_decay();
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.favor.is_empty() {
            return "The heavens are silent".to_string();
        }
        self.favor
            .iter()
            .map(|(deity, &favor)| format!("{deity} {favor:+} ({})", disposition(favor)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
