//! AGS CLI
//!
//! Command-line interface for running ArcGIS Server geoprocessing tasks:
//! submit asynchronous jobs, check their status, and execute synchronous
//! tasks.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ags")]
#[command(about = "ArcGIS Server geoprocessing CLI", long_about = None)]
struct Cli {
    /// GP task URL (e.g. https://host/arcgis/rest/services/Name/GPServer/Task)
    #[arg(long, env = "AGS_GP_URL")]
    url: String,

    /// Seconds between status polls when waiting
    #[arg(long, default_value_t = 1)]
    interval: u64,

    /// Give up waiting after this many seconds (unbounded if omitted)
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ags_cli=warn,ags_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        service_url: cli.url,
        poll_interval: Duration::from_secs(cli.interval),
        poll_timeout: cli.timeout.map(Duration::from_secs),
    };

    handle_command(cli.command, &config).await
}
