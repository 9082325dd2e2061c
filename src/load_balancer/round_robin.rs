//! Round-robin selection strategy.

use crate::load_balancer::Selector;
use crate::routing::BackendEntry;

/// Round-robin selector.
/// Each call advances the entry's cursor and returns the IP it lands on,
/// so a fresh `["1", "2"]` entry yields `2, 1, 2, 1, ...`.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for RoundRobin {
    fn next_ip<'a>(&self, entry: &'a BackendEntry) -> Option<&'a str> {
        let index = entry.advance_cursor()?;
        entry.ips().get(index).map(String::as_str)
    }
}
