//! Periodic route refresh.
//!
//! # Responsibilities
//! - Refresh routes on a fixed interval
//! - Install only confirmed changes
//! - Exit on the stop signal or when the client is gone
//!
//! # Design Decisions
//! - A tick in progress is never interrupted; stop is observed between ticks
//! - The first tick fires one interval after start (the caller has already
//!   done the initial refresh)

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use url::Url;

use crate::http::client::WeakRoutingClient;

/// Background task that keeps a client's routes current.
pub(crate) struct RouteUpdater {
    client: WeakRoutingClient,
    sources: Vec<Url>,
    interval: Duration,
    timeout: Duration,
}

impl RouteUpdater {
    pub(crate) fn new(
        client: WeakRoutingClient,
        sources: Vec<Url>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            sources,
            // `tokio::time::interval` rejects a zero period.
            interval: interval.max(Duration::from_millis(1)),
            timeout,
        }
    }

    pub(crate) async fn run(self, mut stop: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            sources = self.sources.len(),
            "Route updater starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.recv() => {
                    tracing::info!("Route updater received stop signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(client) = self.client.upgrade() else {
                        tracing::debug!("Routing client dropped, route updater exiting");
                        break;
                    };
                    client.refresh_and_apply(&self.sources, self.timeout).await;
                }
            }
        }
    }
}
