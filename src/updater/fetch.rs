//! Route document fetching.
//!
//! # Responsibilities
//! - Issue one GET per route source, all at once
//! - Accept the first 200 response with a well-formed document
//! - Log and discard every failing source
//!
//! # Design Decisions
//! - All requests share one deadline; when it passes, or when one source
//!   wins, the remaining requests are dropped
//! - If every source fails early, the race ends early too
//! - A discarded source is never an error for the caller

use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::FetchError;
use crate::http::transport::HttpTransport;
use crate::observability::metrics;
use crate::observability::Logger;
use crate::routing::{sanitize, RouteTable};

/// Parse a `{"host": ["ip", ...]}` route document.
///
/// Hostnames come back lowercased.
pub fn decode_routes(body: &[u8]) -> Result<RouteTable, FetchError> {
    let routes: RouteTable = serde_json::from_slice(body)?;
    if routes.keys().any(String::is_empty) {
        return Err(FetchError::EmptyHostname);
    }
    Ok(sanitize(routes))
}

/// Fetch and decode the route document from one source.
pub async fn fetch_routes(
    transport: &dyn HttpTransport,
    source: &Url,
) -> Result<RouteTable, FetchError> {
    let mut request = reqwest::Request::new(Method::GET, source.clone());
    request
        .headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));

    let response = transport
        .execute(request)
        .await
        .map_err(FetchError::Transport)?;
    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(response.status().as_u16()));
    }
    let body = response.bytes().await.map_err(FetchError::Body)?;
    decode_routes(&body)
}

/// Race every source and return the first valid route table.
///
/// Returns `None` when no source succeeds before `timeout`.
pub async fn fetch_first(
    transport: &dyn HttpTransport,
    sources: &[Url],
    timeout: Duration,
    logger: &Logger,
) -> Option<RouteTable> {
    let mut pending: FuturesUnordered<_> = sources
        .iter()
        .map(|source| async move { (source, fetch_routes(transport, source).await) })
        .collect();

    let race = async {
        while let Some((source, result)) = pending.next().await {
            match result {
                Ok(routes) => {
                    logger.debug(format_args!("{}: fetched {} internal hosts", source, routes.len()));
                    return Some(routes);
                }
                Err(e) => {
                    metrics::record_source_error(e.reason());
                    logger.warn(format_args!("{}: {}", source, e));
                }
            }
        }
        None
    };

    match tokio::time::timeout(timeout, race).await {
        Ok(Some(routes)) => Some(routes),
        Ok(None) => {
            if !sources.is_empty() {
                logger.warn(format_args!("all {} route sources failed, keeping current routes", sources.len()));
            }
            None
        }
        Err(_) => {
            metrics::record_source_error("timeout");
            logger.warn(format_args!(
                "no route source answered within {:?}, keeping current routes",
                timeout
            ));
            None
        }
    }
}
