//! Backend selection subsystem.
//!
//! # Data Flow
//! ```text
//! Internal host resolved
//!     → routing::table (shared lock, entry lookup)
//!     → Apply selection policy:
//!         - random.rs (uniform pick, seedable)
//!         - round_robin.rs (advance per-host cursor)
//!     → Return one IP or nothing
//! ```
//!
//! # Design Decisions
//! - Selectors are stateless with respect to hosts; per-host cursors live in
//!   the route table entries
//! - Policy chosen once per client, from configuration
//! - Empty entries never yield an IP

pub mod random;
pub mod round_robin;

use crate::config::SelectionPolicy;
use crate::routing::BackendEntry;

pub use random::RandomSelector;
pub use round_robin::RoundRobin;

/// Strategy for picking one IP out of a host's backends.
pub trait Selector: Send + Sync + std::fmt::Debug {
    /// Pick one IP from `entry`, or `None` if it has no backends.
    fn next_ip<'a>(&self, entry: &'a BackendEntry) -> Option<&'a str>;
}

/// Build the selector for a configured policy.
pub fn selector_for(policy: SelectionPolicy) -> Box<dyn Selector> {
    match policy {
        SelectionPolicy::Random => Box::new(RandomSelector::new()),
        SelectionPolicy::RoundRobin => Box::new(RoundRobin::new()),
    }
}
