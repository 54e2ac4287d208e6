//! Delay providers
//!
//! Actors only require "some non-negative, bounded delay" before their
//! next step; how that delay is drawn is injected.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::time::Duration;

pub trait DelayProvider: Send + Sync + Debug {
    /// A delay in `0..=max`
    fn delay(&self, max: Duration) -> Duration;
}

/// Always zero; makes runs as fast as the scheduler allows
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayProvider for NoDelay {
    fn delay(&self, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

/// Uniform whole-microsecond delays in `0..=max`
#[derive(Debug)]
pub struct RandomDelay {
    rng: Mutex<StdRng>,
}

impl RandomDelay {
    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl DelayProvider for RandomDelay {
    fn delay(&self, max: Duration) -> Duration {
        let max_us = u64::try_from(max.as_micros()).unwrap_or(u64::MAX);
        if max_us == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.rng.lock().gen_range(0..=max_us))
    }
}
