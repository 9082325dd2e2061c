//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the binaries
//! - Provide the replaceable log sink the routing client reports through
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The client's sink sits behind its own lock, independent of the route
//!   table lock, so logging never waits on routing and vice versa
//! - An unset sink discards messages

use std::fmt::Arguments;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log level for sink messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for the routing client's log messages.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, args: Arguments<'_>);
}

/// Sink that forwards to the `tracing` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", args),
            LogLevel::Info => tracing::info!("{}", args),
            LogLevel::Warn => tracing::warn!("{}", args),
            LogLevel::Error => tracing::error!("{}", args),
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl LogSink for NoOpSink {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}

/// Runtime-replaceable log sink.
#[derive(Default)]
pub struct Logger {
    sink: RwLock<Option<Arc<dyn LogSink>>>,
}

impl Logger {
    /// Logger with no sink; every message is dropped.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Logger forwarding to `tracing`.
    pub fn tracing() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink: RwLock::new(Some(sink)),
        }
    }

    /// Replace the sink. In-flight log calls finish against the old one.
    pub fn set_sink(&self, sink: Option<Arc<dyn LogSink>>) {
        *self.sink.write() = sink;
    }

    pub fn log(&self, level: LogLevel, args: Arguments<'_>) {
        if let Some(sink) = self.sink.read().as_ref() {
            sink.log(level, args);
        }
    }

    pub fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    pub fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    pub fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.sink.read().is_some())
            .finish()
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("lan_router={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
