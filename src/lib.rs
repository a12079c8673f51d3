//! pageship - format, bundle and deploy single-page sites

pub mod cli;
pub mod deploy;
pub mod domain;
pub mod export;
pub mod infra;

use anyhow::Result;
use clap::Parser;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{handle_completions, handle_deploy, handle_export, handle_format, handle_targets},
};

/// Main entry point for the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    if let Err(err) = infra::telemetry::init(&config.logging, cli.verbose) {
        eprintln!("warning: {err}");
    }

    match &cli.command {
        Command::Format(args) => handle_format(args),
        Command::Export(args) => handle_export(args, &config).await,
        Command::Deploy(args) => handle_deploy(args, &config).await,
        Command::Targets(args) => handle_targets(args, &config),
        Command::Completions(args) => {
            handle_completions(args);
            Ok(())
        }
    }
}
