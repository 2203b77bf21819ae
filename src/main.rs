use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookdesk::cli::{self, Cli, LOGIN_REQUIRED};
use bookdesk::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(api_url) = &cli.api_url {
        if let Err(e) = config.override_base_url(api_url) {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    let filter = if cli.log_level.is_some() {
        tracing_subscriber::EnvFilter::new(&log_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("bookdesk v{} using {}", env!("CARGO_PKG_VERSION"), config.api.base_url);

    match cli::run_command(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if cli::needs_login(&e) => {
            eprintln!("{}", LOGIN_REQUIRED);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
