//! Error types shared across the crate.

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors surfaced to callers of the routing client.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The underlying transport failed to complete the request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An internal host has no live backend and the client runs fail-closed.
    #[error("no live backend for internal host {host}")]
    NoBackend { host: String },

    /// A URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for routing client operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Reasons a single route source was discarded during a refresh.
///
/// These never reach the caller of a refresh; they are logged and counted.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or request failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The source answered with something other than 200 OK.
    #[error("bad status code: {0}")]
    Status(u16),

    /// The body could not be read.
    #[error("reading body: {0}")]
    Body(#[source] reqwest::Error),

    /// The body was not a `{"host": ["ip", ...]}` document.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// The document contained an empty hostname key.
    #[error("route document contains an empty hostname")]
    EmptyHostname,
}

impl FetchError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Body(_) => "body",
            FetchError::Decode(_) => "decode",
            FetchError::EmptyHostname => "empty_hostname",
        }
    }
}
