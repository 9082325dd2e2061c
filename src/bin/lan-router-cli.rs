use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use lan_router::config::SelectionPolicy;
use lan_router::observability::{init_logging, TracingSink};
use lan_router::RoutingClient;

#[derive(Parser)]
#[command(name = "lan-router-cli")]
#[command(about = "Inspect and exercise internal route sources", long_about = None)]
struct Cli {
    /// Route source URL. Repeat for redundant sources.
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Seconds to wait for the first source to answer.
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Hostname suffix that marks internal hosts.
    #[arg(long, default_value = ".internal")]
    suffix: String,

    /// Rotate backends instead of picking at random.
    #[arg(long)]
    round_robin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch routes once and print them as JSON
    Routes,
    /// Print the URL a request would actually go to
    Resolve { url: String },
    /// Perform a routed GET and print the response
    Get { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging("warn");

    let timeout = Duration::from_secs(cli.timeout);
    let transport = reqwest::Client::builder().timeout(timeout).build()?;
    let policy = if cli.round_robin {
        SelectionPolicy::RoundRobin
    } else {
        SelectionPolicy::Random
    };
    let client = RoutingClient::builder(transport)
        .internal_suffix(cli.suffix)
        .selection(policy)
        .log_sink(std::sync::Arc::new(TracingSink))
        .build();

    let sources = cli
        .sources
        .iter()
        .map(|s| Url::parse(s))
        .collect::<Result<Vec<_>, _>>()?;
    if !sources.is_empty() {
        client.refresh_and_apply(&sources, timeout).await;
    }

    match cli.command {
        Commands::Routes => {
            println!("{}", serde_json::to_string_pretty(&client.routes())?);
        }
        Commands::Resolve { url } => {
            println!("{}", client.resolve(Url::parse(&url)?));
        }
        Commands::Get { url } => {
            let res = client.get(&url).await?;
            let status = res.status();
            let body = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: {} returned status {}", url, status);
            }
            println!("{}", body);
        }
    }

    Ok(())
}
