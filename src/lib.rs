//! Client-side routing for internal services.
//!
//! Outbound requests to hosts ending in a reserved suffix (`.internal` by
//! default) are rewritten to one of the host's live backend IPs. Everything
//! else goes to the transport untouched. Backend IPs come from JSON route
//! documents polled from redundant sources.

// Route table and selection
pub mod routing;
pub mod load_balancer;

// Refresh and request path
pub mod updater;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use config::schema::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use http::{HttpTransport, RoutingClient};
pub use routing::RouteTable;
