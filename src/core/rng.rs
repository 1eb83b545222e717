//! Deterministic random number generation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Serializable**: O(1) state capture and restore via ChaCha8's word position
//!
//! Every random decision the combat core makes (shuffles, ranged damage,
//! weighted effect branches, random targets) draws from a single
//! `CombatRng` stored on the state, so a seed plus an action log replays
//! an entire combat exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG owned by the combat state.
///
/// Uses ChaCha8 for speed while maintaining high-quality randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "CombatRngState", into = "CombatRngState")]
pub struct CombatRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl CombatRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Generate a random integer in `min..=max`.
    ///
    /// Returns `min` when the range is empty or inverted.
    pub fn gen_range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Choose an index with weighted probability.
    ///
    /// Weights do not need to sum to 1.0. Uses cumulative-threshold
    /// selection so branch order is significant for replay stability.
    ///
    /// Returns `None` if weights are empty or all zero.
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }

        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let mut threshold = self.inner.gen::<f32>() * total;

        for (i, &weight) in weights.iter().enumerate() {
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }

        // Floating point edge case - return last weight
        Some(weights.len() - 1)
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> CombatRngState {
        CombatRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &CombatRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for snapshots.
///
/// Uses ChaCha8's word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

impl From<CombatRngState> for CombatRng {
    fn from(state: CombatRngState) -> Self {
        Self::from_state(&state)
    }
}

impl From<CombatRng> for CombatRngState {
    fn from(rng: CombatRng) -> Self {
        rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = CombatRng::new(42);
        let mut rng2 = CombatRng::new(42);

        for _ in 0..100 {
            assert_eq!(
                rng1.gen_range_inclusive(0, 1000),
                rng2.gen_range_inclusive(0, 1000)
            );
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = CombatRng::new(1);
        let mut rng2 = CombatRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range_inclusive(0, 1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range_inclusive(0, 1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_inclusive_bounds() {
        let mut rng = CombatRng::new(7);

        for _ in 0..200 {
            let v = rng.gen_range_inclusive(3, 5);
            assert!((3..=5).contains(&v));
        }

        // Degenerate and inverted ranges return min
        assert_eq!(rng.gen_range_inclusive(4, 4), 4);
        assert_eq!(rng.gen_range_inclusive(9, 2), 9);
    }

    #[test]
    fn test_shuffle() {
        let mut rng = CombatRng::new(42);
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let original = data.clone();

        rng.shuffle(&mut data);

        assert_eq!(data.len(), original.len());
        assert_ne!(data, original);

        data.sort();
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_choose() {
        let mut rng = CombatRng::new(42);
        let items = vec![1, 2, 3, 4, 5];

        let chosen = rng.choose(&items);
        assert!(chosen.is_some());
        assert!(items.contains(chosen.unwrap()));

        let empty: Vec<i32> = vec![];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn test_choose_weighted() {
        let mut rng = CombatRng::new(42);

        // Heavily weighted towards index 0
        let weights = vec![100.0, 0.0, 0.0];
        for _ in 0..10 {
            assert_eq!(rng.choose_weighted(&weights), Some(0));
        }

        // Empty weights
        assert_eq!(rng.choose_weighted(&[]), None);

        // All zero weights
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut rng = CombatRng::new(42);

        // Advance the RNG
        for _ in 0..100 {
            rng.gen_range_inclusive(0, 1000);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_range_inclusive(0, 1000)).collect();

        let mut restored = CombatRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_range_inclusive(0, 1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let mut rng = CombatRng::new(42);
        rng.gen_range_inclusive(0, 100);

        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: CombatRng = serde_json::from_str(&json).unwrap();

        assert_eq!(
            rng.gen_range_inclusive(0, 1000),
            restored.gen_range_inclusive(0, 1000)
        );
    }
}
