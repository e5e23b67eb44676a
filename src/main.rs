//! mender CLI entry point.

use clap::Parser;

use mender::cli::{handle_error, Cli, Commands};
use mender::infrastructure::config::ConfigLoader;
use mender::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A broken config is reported by the command itself; logging falls back to defaults.
    let log_config = ConfigLoader::load()
        .map(|config| LogConfig::from(&config.logging))
        .unwrap_or_default();
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => mender::cli::commands::init::execute(args, cli.json).await,
        Commands::Remediate(args) => mender::cli::commands::remediate::execute(args, cli.json).await,
        Commands::Jobs(args) => mender::cli::commands::jobs::execute(args, cli.json).await,
        Commands::Species(args) => mender::cli::commands::species::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
