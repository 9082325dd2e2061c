//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Abstract "send this request, give me a response"
//! - Provide the default `reqwest` implementation with timeouts from config
//!
//! # Design Decisions
//! - The routing client never builds connections itself; everything goes
//!   through an injected `HttpTransport`
//! - Only GET and the caller's own requests pass through, no retries here

use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::config::TransportConfig;

/// Anything that can execute an HTTP request.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: reqwest::Request) -> BoxFuture<'_, reqwest::Result<reqwest::Response>>;
}

impl HttpTransport for reqwest::Client {
    fn execute(&self, request: reqwest::Request) -> BoxFuture<'_, reqwest::Result<reqwest::Response>> {
        Box::pin(reqwest::Client::execute(self, request))
    }
}

/// Build the default transport.
pub fn build_transport(config: &TransportConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_transport() {
        assert!(build_transport(&TransportConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_client_executes_through_trait_object() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_transport(&TransportConfig::default()).unwrap();
        let transport: &dyn HttpTransport = &client;
        let url = format!("http://{}/routes", addr).parse().unwrap();
        let request = reqwest::Request::new(reqwest::Method::GET, url);

        let err = transport.execute(request).await.unwrap_err();
        assert!(err.is_connect() || err.is_request());
    }
}
