// src/random.rs
//! Injectable randomness for image picks, result pages and synthetic ratings.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Callers guarantee `len > 0`.
    fn pick(&self, len: usize) -> usize;
    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64;
}

pub type DynRandom = Arc<dyn RandomSource>;

/// Production source backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }

    fn unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible source for tests and local debugging.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        self.rng.lock().random_range(0..len)
    }

    fn unit(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// Always returns the same values. `index` is clamped to the slice length.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub index: usize,
    pub unit: f64,
}

impl RandomSource for FixedRandom {
    fn pick(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn unit(&self) -> f64 {
        self.unit.clamp(0.0, 1.0)
    }
}

/// Synthetic rating in `[min, max]`, rounded to one decimal.
pub fn rating_between(rng: &dyn RandomSource, min: f64, max: f64) -> f64 {
    let raw = min + rng.unit() * (max - min);
    ((raw * 10.0).round() / 10.0).clamp(min, max)
}
