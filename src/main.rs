//! Route table daemon.
//!
//! Loads a configuration, keeps the route table current from its sources
//! and reports every change until interrupted. Useful for checking what a
//! set of route sources publishes before wiring the client into a service.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use lan_router::config::load_config;
use lan_router::observability::{init_logging, metrics};
use lan_router::{RouterConfig, RoutingClient};

#[derive(Parser)]
#[command(name = "lan-router")]
#[command(about = "Keep an internal route table in sync with its sources", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    init_logging(&config.observability.log_level);
    tracing::info!("lan-router v0.1.0 starting");

    tracing::info!(
        internal_suffix = %config.routing.internal_suffix,
        selection = ?config.routing.selection,
        fail_mode = ?config.routing.fail_mode,
        sources = config.updater.sources.len(),
        interval_secs = config.updater.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = RoutingClient::from_config(&config)?;

    let sources = config
        .updater
        .sources
        .iter()
        .map(|s| Url::parse(s))
        .collect::<Result<Vec<_>, _>>()?;

    if sources.is_empty() {
        tracing::warn!("No route sources configured, serving static routes only");
    } else {
        client
            .start_updating(sources, config.updater.interval(), config.updater.timeout())
            .await;
    }

    tracing::info!(hosts = client.routes().len(), "Initial routes loaded");

    let mut generation = client.routes_generation();
    let mut report = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = report.tick() => {
                let current = client.routes_generation();
                if current != generation {
                    generation = current;
                    let routes = client.routes();
                    tracing::info!(hosts = routes.len(), generation, "Route table updated");
                    for (host, ips) in &routes {
                        tracing::debug!(host = %host, backends = ?ips, "Route");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, stopping route updater");
                break;
            }
        }
    }

    client.stop_updating();
    tracing::info!("Shutdown complete");
    Ok(())
}
