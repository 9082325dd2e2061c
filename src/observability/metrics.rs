//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lan_router_refresh_total` (counter): refreshes by outcome (updated, unchanged, fallback)
//! - `lan_router_route_changes_total` (counter): installed route tables
//! - `lan_router_source_errors_total` (counter): discarded route sources by reason
//! - `lan_router_resolutions_total` (counter): internal lookups by outcome
//! - `lan_router_routed_hosts` (gauge): hosts in the live table
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_refresh(outcome: &'static str) {
    counter!("lan_router_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_route_change(hosts: usize) {
    counter!("lan_router_route_changes_total").increment(1);
    gauge!("lan_router_routed_hosts").set(hosts as f64);
}

pub fn record_source_error(reason: &'static str) {
    counter!("lan_router_source_errors_total", "reason" => reason).increment(1);
}

pub fn record_resolution(outcome: &'static str) {
    counter!("lan_router_resolutions_total", "outcome" => outcome).increment(1);
}
