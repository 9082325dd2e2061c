//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request
//!     → client.rs (RoutingClient::execute)
//!     → resolve.rs (internal host? pick backend, rewrite authority)
//!     → transport.rs (injected HTTP transport)
//!     → Response
//! ```

pub mod client;
pub mod resolve;
pub mod transport;

pub use client::{RoutingClient, RoutingClientBuilder};
pub use resolve::{HostResolver, Lookup};
pub use transport::{build_transport, HttpTransport};
