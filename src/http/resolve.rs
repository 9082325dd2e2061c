//! Outbound URL resolution.
//!
//! # Responsibilities
//! - Decide whether a URL targets an internal host
//! - Swap the host for a selected backend IP, keeping scheme, port and path
//! - Leave everything else untouched
//!
//! # Design Decisions
//! - Hosts without the internal suffix are never looked up
//! - URLs without a host are treated as external
//! - Suffix matching is case-insensitive; `Url` already lowercases hosts
//! - Fail-open by default; `try_resolve` is the fail-closed variant

use std::net::IpAddr;

use url::Url;

use crate::error::{RouterError, RouterResult};
use crate::load_balancer::Selector;
use crate::observability::metrics;
use crate::routing::RouteStore;

/// Result of looking a URL up in the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Not an internal host.
    External,
    /// Internal host with a selected backend IP.
    Routed(String),
    /// Internal host that is unknown or has no live backend.
    NoBackend(String),
}

/// Rewrites internal hosts to backend IPs.
#[derive(Debug)]
pub struct HostResolver {
    suffix: String,
    selector: Box<dyn Selector>,
}

impl HostResolver {
    pub fn new(suffix: impl Into<String>, selector: Box<dyn Selector>) -> Self {
        let suffix: String = suffix.into();
        Self {
            suffix: suffix.to_ascii_lowercase(),
            selector,
        }
    }

    /// Suffix that marks a host as internal.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether `host` is eligible for rewriting.
    pub fn is_internal(&self, host: &str) -> bool {
        host.len() >= self.suffix.len()
            && host.as_bytes()[host.len() - self.suffix.len()..]
                .eq_ignore_ascii_case(self.suffix.as_bytes())
    }

    /// Classify `url` and pick a backend if it is internal.
    pub fn lookup(&self, store: &RouteStore, url: &Url) -> Lookup {
        let Some(host) = url.host_str() else {
            return Lookup::External;
        };
        if !self.is_internal(host) {
            return Lookup::External;
        }
        match store.pick(host, self.selector.as_ref()) {
            Some(ip) => {
                metrics::record_resolution("routed");
                Lookup::Routed(ip)
            }
            None => {
                metrics::record_resolution("no_backend");
                Lookup::NoBackend(host.to_string())
            }
        }
    }

    /// Rewrite `url` to a backend IP if internal; otherwise return it unchanged.
    pub fn resolve(&self, store: &RouteStore, url: Url) -> Url {
        match self.lookup(store, &url) {
            Lookup::Routed(ip) => rewrite_host(url, &ip),
            Lookup::External | Lookup::NoBackend(_) => url,
        }
    }

    /// Like `resolve`, but an internal host without a backend is an error.
    pub fn try_resolve(&self, store: &RouteStore, url: Url) -> RouterResult<Url> {
        match self.lookup(store, &url) {
            Lookup::Routed(ip) => Ok(rewrite_host(url, &ip)),
            Lookup::External => Ok(url),
            Lookup::NoBackend(host) => Err(RouterError::NoBackend { host }),
        }
    }
}

/// Replace the host of `url` with `ip`. The port, if any, is kept.
fn rewrite_host(mut url: Url, ip: &str) -> Url {
    let result = match ip.parse::<IpAddr>() {
        Ok(addr) => url.set_ip_host(addr),
        Err(_) => url.set_host(Some(ip)).map_err(|_| ()),
    };
    if result.is_err() {
        tracing::warn!(backend = %ip, url = %url, "Backend address not usable as a host, leaving URL unchanged");
    }
    url
}
