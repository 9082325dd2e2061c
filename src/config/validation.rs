//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route source URLs are usable
//! - Validate value ranges (interval and timeout > 0)
//! - Check static routes and the internal suffix are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use url::Url;

use crate::config::schema::RouterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Internal suffix is empty or does not start with '.'.
    InvalidSuffix(String),
    /// A route source is not an http(s) URL.
    InvalidSource { source: String, reason: String },
    /// Refresh interval is zero.
    ZeroInterval,
    /// Refresh timeout is zero.
    ZeroTimeout,
    /// A static route has an empty hostname.
    EmptyStaticHost,
    /// A metrics address does not parse as a socket address.
    InvalidMetricsAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidSuffix(s) => {
                write!(f, "internal_suffix '{}' must be non-empty and start with '.'", s)
            }
            ValidationError::InvalidSource { source, reason } => {
                write!(f, "route source '{}' is invalid: {}", source, reason)
            }
            ValidationError::ZeroInterval => write!(f, "updater.interval_secs must be > 0"),
            ValidationError::ZeroTimeout => write!(f, "updater.timeout_secs must be > 0"),
            ValidationError::EmptyStaticHost => write!(f, "static route with empty hostname"),
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "metrics_address '{}' is not a socket address", addr)
            }
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let suffix = &config.routing.internal_suffix;
    if suffix.len() < 2 || !suffix.starts_with('.') {
        errors.push(ValidationError::InvalidSuffix(suffix.clone()));
    }

    if config.routing.static_routes.keys().any(|host| host.is_empty()) {
        errors.push(ValidationError::EmptyStaticHost);
    }

    for source in &config.updater.sources {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidSource {
                source: source.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidSource {
                source: source.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if config.updater.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.updater.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
