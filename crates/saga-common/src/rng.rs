//! Injectable random sources.
//!
//! Every subsystem draws randomness through [`RandomSource`] so that the
//! engine can run on a real generator in production and on a fixed
//! sequence in tests.

/// A source of uniform floats in `[0.0, 1.0)`.
pub trait RandomSource {
    /// Returns the next value in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// Returns `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Returns an index in `[0, len)`. Returns 0 for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Returns an integer in `[low, high)`. Returns `low` for an empty range.
    fn range_i64(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        low + self.index((high - low) as usize) as i64
    }

    /// Returns a float in `[low, high)`.
    fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }
}

/// Production random source backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct FastRandom {
    rng: fastrand::Rng,
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl FastRandom {
    /// Creates a randomly seeded source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a source with a fixed seed (reproducible runs).
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl RandomSource for FastRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.f64()
    }
}

/// Replays a fixed sequence of values, cycling when exhausted.
///
/// Values are clamped into `[0.0, 1.0)`. An empty script always yields 0.0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Largest value the script will hand out.
    const MAX: f64 = 0.999_999_999;

    /// Creates a source replaying `values`.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Creates a source that always yields `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, Self::MAX)
    }
}

/// Weighted categorical draw.
///
/// Rolls a uniform value in `[0, total)` and walks the weights in order,
/// subtracting each one until the remainder is at most zero. A roll that
/// lands exactly on a boundary belongs to the earlier entry. Zero-weight
/// entries are skipped, so they are never selected unless every weight is
/// zero, in which case the first index is returned. If float rounding leaves
/// a remainder after the last entry, the first entry carrying weight wins.
pub fn weighted_index(weights: &[u32], rng: &mut dyn RandomSource) -> usize {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return 0;
    }

    let mut remaining = rng.next_f64() * total as f64;
    for (idx, &weight) in weights.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        remaining -= f64::from(weight);
        if remaining <= 0.0 {
            return idx;
        }
    }

    weights.iter().position(|&w| w > 0).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fast_random_seeded_is_reproducible() {
        let mut a = FastRandom::with_seed(42);
        let mut b = FastRandom::with_seed(42);
        for _ in 0..10 {
            assert!((a.next_f64() - b.next_f64()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_scripted_cycles_and_clamps() {
        let mut rng = ScriptedRandom::new(vec![0.1, 1.5, -0.2]);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert!(rng.next_f64() < 1.0);
        assert!(rng.next_f64().abs() < f64::EPSILON);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_empty_script_yields_zero() {
        let mut rng = ScriptedRandom::default();
        assert!(rng.next_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn test_range_helpers() {
        let mut rng = ScriptedRandom::constant(0.5);
        assert_eq!(rng.range_i64(20, 70), 45);
        assert_eq!(rng.range_i64(5, 5), 5);
        assert_eq!(rng.index(0), 0);
        assert_eq!(rng.index(4), 2);
        assert!((rng.range_f64(0.15, 0.35) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_index_walks_in_order() {
        let weights = [2, 0, 3, 5];
        // total 10: [0,2] -> 0, (2,5] -> 2, (5,10) -> 3
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.0)), 0);
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.19)), 0);
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.2)), 0);
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.21)), 2);
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.5)), 2);
        assert_eq!(weighted_index(&weights, &mut ScriptedRandom::constant(0.99)), 3);
    }

    #[test]
    fn test_weighted_index_skips_leading_zero_weight() {
        assert_eq!(weighted_index(&[0, 4, 6], &mut ScriptedRandom::constant(0.0)), 1);
        assert_eq!(weighted_index(&[0, 4, 6], &mut ScriptedRandom::constant(0.4)), 1);
        assert_eq!(weighted_index(&[0, 4, 6], &mut ScriptedRandom::constant(0.41)), 2);
    }

    #[test]
    fn test_weighted_index_all_zero_falls_back() {
        assert_eq!(weighted_index(&[0, 0, 0], &mut ScriptedRandom::constant(0.7)), 0);
        assert_eq!(weighted_index(&[], &mut ScriptedRandom::constant(0.7)), 0);
    }

    proptest! {
        #[test]
        fn prop_weighted_index_never_picks_zero_weight(
            weights in proptest::collection::vec(0u32..20, 1..10),
            roll in 0.0f64..1.0,
        ) {
            let idx = weighted_index(&weights, &mut ScriptedRandom::constant(roll));
            prop_assert!(idx < weights.len());
            if weights.iter().any(|&w| w > 0) {
                prop_assert!(weights[idx] > 0);
            }
        }
    }
}
