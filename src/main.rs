//! codembed CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use codembed::cli::{handle_error, Cli, Commands};
use codembed::infrastructure::config::ConfigLoader;
use codembed::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref(), &cli.overrides)?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Embed => codembed::cli::commands::embed::execute(&config, cli.json, cli.quiet).await,
        Commands::Index => codembed::cli::commands::index::execute(&config, cli.json).await,
        Commands::Search { query, top } => {
            codembed::cli::commands::search::execute(&config, &query, top, cli.json, cli.quiet).await
        }
    }
}
