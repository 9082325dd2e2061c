//! Route refresh subsystem.
//!
//! # Data Flow
//! ```text
//! start_updating(sources, interval)
//!     → fetch.rs (race all sources, first valid document wins)
//!     → routing::diff (compare against live snapshot)
//!     → routing::table (install on change)
//!     → periodic.rs (repeat every interval)
//!     → signal.rs (stop between ticks)
//! ```
//!
//! # Design Decisions
//! - Source failures are logged, never propagated
//! - No answer before the deadline keeps the previous routes
//! - Unchanged documents never take the route table's write lock

pub mod fetch;
pub(crate) mod periodic;
pub mod signal;

pub use fetch::{decode_routes, fetch_first, fetch_routes};
pub use signal::StopSignal;
