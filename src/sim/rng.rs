//! Randomness seam
//!
//! Tile spawns, item and drop placement, and card shuffles all draw from a
//! `RandomSource` handed to the engine at construction. Production code uses
//! a seeded PCG stream; tests script exact values.

use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform random values
pub trait RandomSource: fmt::Debug {
    /// Uniform value in `[0, 1)`
    fn unit(&mut self) -> f32;

    /// Uniform index in `[0, len)`; 0 when `len` is 0
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.unit() * len as f32) as usize).min(len - 1)
    }

    /// Uniform value in `[min, max]`; `min` when the range is empty
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.unit()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}

/// Fisher-Yates shuffle driven by a `RandomSource`
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// PCG-backed source for real play
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream (one per launched mini-game)
    pub fn fork(&mut self) -> SeededRandom {
        SeededRandom::new(self.rng.random::<u64>())
    }
}

impl RandomSource for SeededRandom {
    fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed sequence of unit values, then repeats `fallback`
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<f32>,
    fallback: f32,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn push(&mut self, value: f32) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        self.values
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(0.0, 0.999_999)
    }
}
