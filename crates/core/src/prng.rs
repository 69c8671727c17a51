//! Deterministic randomness for seed selection.
//!
//! [`Xorshift64`] drives both the seed permutation ([`shuffle`]) and the
//! sub-cell jitter applied to every seed, so one `u64` reproduces a whole
//! hatching run on any platform.

use serde::{Deserialize, Serialize};

/// Xorshift64 PRNG with the standard (13, 7, 17) shifts.
///
/// A seed of 0 would be a fixed point of the recurrence, so it is replaced
/// by a non-zero fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() % max as u64) as usize
    }
}

/// Shuffles `items` in place with the Fisher–Yates algorithm.
///
/// Walks from the back; each position is swapped with a uniformly chosen
/// position at or before it, so every permutation is equally likely.
pub fn shuffle<T>(items: &mut [T], rng: &mut Xorshift64) {
    for current in (1..items.len()).rev() {
        let pick = rng.next_usize(current + 1);
        items.swap(current, pick);
    }
}
