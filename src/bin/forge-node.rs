#![forbid(unsafe_code)]
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use forgechain::api::run_api_server;
use forgechain::config::load_config_from;
use forgechain::ledger::Ledger;

#[derive(Parser)]
#[command(author, version, about = "Run the forgechain API node", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let config = load_config_from(&cli.config)?;
    info!(
        "Starting forgechain node (difficulty = {}, bind = {})",
        config.mining.difficulty, config.api.bind_addr
    );

    let ledger = Arc::new(Ledger::new(config.mining.difficulty)?);
    run_api_server(ledger, &config.api.bind_addr).await
}
