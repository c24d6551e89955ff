//! Rumors and how they spread.
//!
//! Each retelling may distort a rumor. Distortion rewrites a word or adds an
//! embellishment and costs the rumor some of its truth. Each rewrite applies
//! at most once and a rumor is embellished only once, so retold text stays
//! bounded. Recent hops are recorded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use saga_common::RandomSource;

use crate::calendar::CalendarDate;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Oldest rumors are forgotten past this count.
pub const MAX_RUMORS: usize = 50;
/// Oldest hops are dropped from a rumor's provenance past this count.
pub const MAX_PROVENANCE: usize = 20;
/// Mutation chance is drawn from this range on every spread.
const MUTATION_CHANCE: (f64, f64) = (0.15, 0.35);
/// Truth lost per distortion.
const TRUTH_DECAY: f64 = 0.1;
/// Rumors listed in the summary.
const SUMMARY_LIMIT: usize = 3;

/// Word swaps applied when a rumor is distorted.
const SUBSTITUTIONS: [(&str, &str); 8] = [
    ("soldiers", "an army"),
    ("clashed", "slaughtered"),
    ("thieves", "cutthroats"),
    ("seen", "sworn to have been seen"),
    ("has fallen", "was burned to the ground"),
    ("a flood", "a great deluge"),
    ("has begun", "has begun, and the king is worried"),
    ("over", "over, for now"),
];

/// Tails added when no substitution applies.
const EMBELLISHMENTS: [&str; 4] = [
    ", or so they say",
    ", and worse is coming",
    ", though the priests deny it",
    ", by the word of a drunk sailor",
];

/// One stop on a rumor's journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RumorHop {
    /// Where it was told
    pub location: String,
    /// When it was told
    pub date: CalendarDate,
    /// Whether the telling changed it
    pub mutated: bool,
}

/// A rumor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rumor {
    /// Unique id within this world
    pub id: u64,
    /// Current wording
    pub text: String,
    /// How much of the original truth survives (0.0-1.0)
    pub truth: f64,
    /// Where it started
    pub origin: String,
    /// Every place that has heard it
    pub known_in: BTreeSet<String>,
    /// Every telling, in order
    pub provenance: Vec<RumorHop>,
}

/// All circulating rumors, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RumorState {
    /// Circulating rumors
    pub rumors: Vec<Rumor>,
    /// Next id to hand out
    pub next_id: u64,
}

impl RumorState {
    /// Creates an empty rumor mill.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new rumor at `origin`. Returns its id.
    pub fn seed_rumor(&mut self, text: impl Into<String>, origin: &str, date: CalendarDate) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.rumors.push(Rumor {
            id: self.next_id,
            text: text.into(),
            truth: 1.0,
            origin: origin.to_string(),
            known_in: BTreeSet::from([origin.to_string()]),
            provenance: vec![RumorHop {
                location: origin.to_string(),
                date,
                mutated: false,
            }],
        });
        trim_front(&mut self.rumors, MAX_RUMORS);
        self.next_id
    }

    /// Looks up a rumor.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Rumor> {
        self.rumors.iter().find(|r| r.id == id)
    }

    /// Carries a rumor to `location`. Returns `false` when the id is unknown.
    pub fn spread(
        &mut self,
        id: u64,
        location: &str,
        date: CalendarDate,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let Some(rumor) = self.rumors.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        let chance = rng.range_f64(MUTATION_CHANCE.0, MUTATION_CHANCE.1);
        let mutated = rng.chance(chance);
        if mutated {
            rumor.text = distort(&rumor.text, rng);
            rumor.truth = (rumor.truth - TRUTH_DECAY).max(0.0);
        }
        rumor.provenance.push(RumorHop {
            location: location.to_string(),
            date,
            mutated,
        });
        trim_front(&mut rumor.provenance, MAX_PROVENANCE);
        rumor.known_in.insert(location.to_string());
        true
    }
}

fn trim_front<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}

/// Byte offset of `word` in `text` where it stands as a whole word.
fn find_word(text: &str, word: &str) -> Option<usize> {
    text.match_indices(word).map(|(at, _)| at).find(|&at| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn distort(text: &str, rng: &mut dyn RandomSource) -> String {
    let candidates: Vec<(usize, &str, &str)> = SUBSTITUTIONS
        .iter()
        .filter(|(_, to)| !text.contains(to))
        .filter_map(|&(from, to)| find_word(text, from).map(|at| (at, from, to)))
        .collect();
    if candidates.is_empty() {
        if EMBELLISHMENTS.iter().any(|tail| text.ends_with(tail)) {
            return text.to_string();
        }
        let tail = EMBELLISHMENTS[rng.index(EMBELLISHMENTS.len())];
        return format!("{text}{tail}");
    }
    let (at, from, to) = candidates[rng.index(candidates.len())];
    format!("{}{to}{}", &text[..at], &text[at + from.len()..])
}

impl Subsystem for RumorState {
    fn name(&self) -> &'static str {
        "rumors"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        trim_front(&mut self.rumors, MAX_RUMORS);
        for rumor in &mut self.rumors {
            rumor.truth = rumor.truth.clamp(0.0, 1.0);
            trim_front(&mut rumor.provenance, MAX_PROVENANCE);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Daily || self.rumors.is_empty() {
            return Vec::new();
        }
        let id = self.rumors[ctx.rng.index(self.rumors.len())].id;
        if let Some(location) = ctx.random_location() {
            self.spread(id, &location, ctx.date, ctx.rng);
        }
        Vec::new()
    }

    fn summary(&self) -> String {
        if self.rumors.is_empty() {
            return "No rumors on the wind".to_string();
        }
        self.rumors
            .iter()
            .rev()
            .take(SUMMARY_LIMIT)
            .map(|r| format!("\"{}\" (heard in {})", r.text, r.known_in.len()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
