//! pdfqa CLI entry point.

use anyhow::Context;
use clap::Parser;

use pdfqa::cli::{commands, Cli, Commands};
use pdfqa::infrastructure::config::ConfigLoader;
use pdfqa::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => pdfqa::cli::handle_error(&err, cli.json),
    };

    let logger = match LogConfig::try_from(&config.logging)
        .and_then(|log_config| LoggerImpl::init(&log_config))
        .context("Failed to initialize logging")
    {
        Ok(logger) => logger,
        Err(err) => pdfqa::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Index(args) => commands::index::execute(args, &config, cli.json).await,
        Commands::Search(args) => commands::search::execute(args, &config, cli.json).await,
        Commands::Chat(args) => commands::chat::execute(args, &config, cli.json).await,
        Commands::Models => commands::models::execute(&config, cli.json),
        Commands::Config(command) => commands::config::execute(&command, &config, cli.json),
    };

    if let Err(err) = result {
        drop(logger);
        pdfqa::cli::handle_error(&err, cli.json);
    }
}
