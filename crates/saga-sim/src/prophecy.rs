//! Prophecies that creep toward fulfillment.

use serde::{Deserialize, Serialize};

use saga_common::RandomSource;

use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Progress at which a prophecy comes true.
pub const FULFILLMENT: u32 = 100;
/// Deity credited with prophecies spoken without a named patron.
pub const DEFAULT_PATRON: &str = "The Weaver";
/// Monthly progress, upper bound exclusive.
const MONTHLY_PROGRESS: (i64, i64) = (5, 20);

/// A prophecy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prophecy {
    /// Unique id within this world
    pub id: u64,
    /// The words spoken
    pub text: String,
    /// Who or what it concerns
    pub subject: String,
    /// Deity credited when it comes true
    pub patron: String,
    /// 0-100
    pub progress: u32,
    /// Whether it has come to pass
    pub fulfilled: bool,
}

/// Spoken prophecies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProphecyState {
    /// Every prophecy, fulfilled or not
    pub prophecies: Vec<Prophecy>,
    /// Next id to hand out
    pub next_id: u64,
}

impl ProphecyState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a prophecy under the default patron. Returns its id.
    pub fn add_prophecy(&mut self, text: &str, subject: &str) -> u64 {
        self.add_prophecy_with_patron(text, subject, DEFAULT_PATRON)
    }

    /// Records a prophecy credited to `patron`. Returns its id.
    pub fn add_prophecy_with_patron(&mut self, text: &str, subject: &str, patron: &str) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.prophecies.push(Prophecy {
            id: self.next_id,
            text: text.to_string(),
            subject: subject.to_string(),
            patron: patron.to_string(),
            progress: 0,
            fulfilled: false,
        });
        self.next_id
    }

    /// Advances a prophecy by `amount`. Returns `true` if this push
    /// fulfilled it.
    pub fn advance(&mut self, id: u64, amount: u32) -> bool {
        let Some(prophecy) = self
            .prophecies
            .iter_mut()
            .find(|p| p.id == id && !p.fulfilled)
        else {
            return false;
        };
        prophecy.progress = prophecy.progress.saturating_add(amount).min(FULFILLMENT);
        if prophecy.progress >= FULFILLMENT {
            prophecy.fulfilled = true;
            tracing::info!("Prophecy fulfilled: {}", prophecy.text);
        }
        prophecy.fulfilled
    }

    /// Unfulfilled prophecies.
    pub fn pending(&self) -> impl Iterator<Item = &Prophecy> {
        self.prophecies.iter().filter(|p| !p.fulfilled)
    }
}

impl Subsystem for ProphecyState {
    fn name(&self) -> &'static str {
        "prophecies"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        if self.prophecies.is_empty() {
            let id = self.add_prophecy_with_patron(
                "When the twin moons bleed, the crown shall pass to a stranger",
                "Kingdom of Valmere",
                "Morvath",
            );
            self.advance(id, 20);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Monthly {
            return Vec::new();
        }
        let ids: Vec<u64> = self.pending().map(|p| p.id).collect();
        let mut signals = Vec::new();
        for id in ids {
            let amount = ctx.rng.range_i64(MONTHLY_PROGRESS.0, MONTHLY_PROGRESS.1) as u32;
            if self.advance(id, amount) {
                if let Some(p) = self.prophecies.iter().find(|p| p.id == id) {
                    signals.push(WorldSignal::ProphecyFulfilled {
                        text: p.text.clone(),
                        patron: p.patron.clone(),
                    });
                }
            }
        }
        signals
    }

    fn summary(&self) -> String {
        let pending: Vec<String> = self
            .pending()
            .map(|p| format!("\"{}\" ({}, {}% come to pass)", p.text, p.subject, p.progress))
            .collect();
        if pending.is_empty() {
            "No prophecies hang over the land".to_string()
        } else {
            pending.join("; ")
        }
    }
}
