//! Seeded linear congruential generator.
//!
//! `state = (state * 9301 + 49297) mod 233280`, `draw = state / 233280`.
//! Every random decision of a scheduler goes through one instance, so a run
//! is reproducible from its seed. Implements [`rand::RngCore`], so rand's
//! slice and range helpers draw from the same sequence.

use rand::seq::SliceRandom;
use rand::RngCore;

/// LCG modulus; also the number of distinct states.
pub const LCG_MODULUS: u64 = 233_280;
const LCG_MULTIPLIER: u64 = 9_301;
const LCG_INCREMENT: u64 = 49_297;

/// Scheduler-scoped pseudo-random generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Creates a generator. Seeds are taken modulo [`LCG_MODULUS`].
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Uniform index in `0..len`. Returns 0 for `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Shuffles `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * (u32::MAX as f64 + 1.0)) as u32
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
