//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the routing client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Internal host matching and backend selection.
    pub routing: RoutingConfig,

    /// Periodic route refresh settings.
    pub updater: UpdaterConfig,

    /// Outbound HTTP client settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How one IP is picked among a host's backends.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Uniform random pick per request.
    #[default]
    Random,
    /// Rotate through backends per host.
    RoundRobin,
}

/// What happens to a request for an internal host with no live backend.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// Send the request unchanged and let the transport fail naturally.
    #[default]
    Open,
    /// Refuse the request with `RouterError::NoBackend`.
    Closed,
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Hostname suffix that marks a host as internal (e.g., ".internal").
    pub internal_suffix: String,

    /// Backend selection policy.
    pub selection: SelectionPolicy,

    /// Behaviour when an internal host has no backend.
    pub fail_mode: FailMode,

    /// Routes installed at startup, before the first refresh.
    pub static_routes: HashMap<String, Vec<String>>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            internal_suffix: ".internal".to_string(),
            selection: SelectionPolicy::default(),
            fail_mode: FailMode::default(),
            static_routes: HashMap::new(),
        }
    }
}

/// Route refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Redundant route document URLs, raced on every refresh.
    pub sources: Vec<String>,

    /// Refresh interval in seconds.
    pub interval_secs: u64,

    /// Deadline for one refresh in seconds. Defaults to the interval.
    pub timeout_secs: Option<u64>,
}

impl UpdaterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(self.interval_secs))
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            interval_secs: 10,
            timeout_secs: None,
        }
    }
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
