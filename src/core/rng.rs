//! Deterministic random number generation for deck permutation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces an identical permutation
//! - **Portable**: Bounded draws are taken as `u32`, so the shuffle does not
//!   depend on the platform's pointer width
//! - **Serializable**: O(1) state capture and restore
//!
//! ## Replay Usage
//!
//! ```
//! use set_engine::core::DeckRng;
//!
//! let mut a = DeckRng::new(42);
//! let mut b = DeckRng::new(42);
//!
//! let mut x: Vec<u32> = (0..20).collect();
//! let mut y = x.clone();
//! a.shuffle(&mut x);
//! b.shuffle(&mut y);
//! assert_eq!(x, y);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG used to permute decks.
///
/// Uses ChaCha8 for speed while keeping a stream that is stable across
/// platforms and crate versions of `rand_chacha`.
#[derive(Clone, Debug)]
pub struct DeckRng {
    inner: ChaCha8Rng,
    seed: Option<u64>,
}

impl DeckRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a non-reproducible RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
            seed: None,
        }
    }

    /// Create from an optional seed: seeded when present, entropy otherwise.
    #[must_use]
    pub fn from_optional(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// The seed this RNG was created from, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw a value uniformly from `0..bound`.
    pub fn below(&mut self, bound: u32) -> u32 {
        self.inner.gen_range(0..bound)
    }

    /// Shuffle a slice in place (Fisher-Yates, back to front).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        assert!(
            slice.len() <= u32::MAX as usize,
            "Cannot shuffle more than u32::MAX elements"
        );
        for i in (1..slice.len()).rev() {
            let j = self.below(i as u32 + 1) as usize;
            slice.swap(i, j);
        }
    }

    /// Get the current state for serialization.
    ///
    /// Returns `None` for entropy-seeded RNGs, which cannot be restored.
    #[must_use]
    pub fn state(&self) -> Option<DeckRngState> {
        self.seed.map(|seed| DeckRngState {
            seed,
            word_pos: self.inner.get_word_pos(),
        })
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &DeckRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: Some(state.seed),
        }
    }
}

/// Serializable RNG state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
