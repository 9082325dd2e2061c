//! Route table subsystem.
//!
//! # Data Flow
//! ```text
//! Route document (JSON) or direct install
//!     → RouteTable (owned copy)
//!     → diff.rs (compare against a fresh snapshot)
//!     → table.rs (install under write lock, only on change)
//!
//! Request path:
//!     host → table.rs (shared lock) → Selector → IP
//! ```
//!
//! # Design Decisions
//! - The live table is never handed out; readers get deep copies
//! - Unchanged refreshes never take the write lock
//! - Tables are replaced wholesale, never patched
//! - Hostnames are normalized to lowercase on the way in

pub mod diff;
pub mod table;

pub use diff::differs;
pub use table::{sanitize, BackendEntry, RouteStore, RouteTable};
