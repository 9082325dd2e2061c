//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing client produces:
//!     → logging.rs (sink messages + structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → tracing subscriber (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogLevel, LogSink, Logger, NoOpSink, TracingSink};
