//! # Score Sources
//!
//! The simulated "AI" checks draw a score uniformly from `[0, 1)` and compare it
//! against a threshold. The draw goes through [`ScoreSource`] so callers can pick
//! unseeded randomness, a reproducible seed, or a fixed value.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Produces scores in `[0, 1)`.
pub trait ScoreSource: Send + Sync {
    fn next_score(&self) -> f64;
}

/// Unseeded scores from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngScores;

impl ScoreSource for ThreadRngScores {
    fn next_score(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible scores from a seeded [`StdRng`].
#[derive(Debug)]
pub struct SeededScores {
    rng: Mutex<StdRng>,
}

impl SeededScores {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ScoreSource for SeededScores {
    fn next_score(&self) -> f64 {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen::<f64>()
    }
}

/// Returns the same score every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedScore(pub f64);

impl ScoreSource for FixedScore {
    fn next_score(&self) -> f64 {
        self.0
    }
}
