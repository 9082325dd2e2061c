//! Uniform random selection strategy.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::load_balancer::Selector;
use crate::routing::BackendEntry;

/// Picks a uniformly random IP per call.
///
/// Unseeded selectors draw from the thread-local generator and take no lock.
/// A seeded selector shares one generator across every host and produces a
/// reproducible sequence.
#[derive(Debug, Default)]
pub struct RandomSelector {
    seeded: Option<Mutex<StdRng>>,
}

impl RandomSelector {
    /// Selector backed by `rand::thread_rng`.
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Selector with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn index(&self, len: usize) -> usize {
        match &self.seeded {
            Some(rng) => rng.lock().gen_range(0..len),
            None => rand::thread_rng().gen_range(0..len),
        }
    }
}

impl Selector for RandomSelector {
    fn next_ip<'a>(&self, entry: &'a BackendEntry) -> Option<&'a str> {
        let ips = entry.ips();
        if ips.is_empty() {
            return None;
        }
        let index = self.index(ips.len());
        Some(ips[index].as_str())
    }
}
