// Loglens - Log Search Analysis Tool
// Copyright (c) 2025 Loglens Contributors
// Licensed under the MIT License

use clap::Parser;
use loglens::cli::commands::load_settings;
use loglens::cli::{Cli, Commands};
use loglens::config::{LoggingConfig, LoglensConfig};
use loglens::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the configuration when it loads; a broken
    // configuration is reported by the command itself
    let loaded = load_settings(&cli.config);
    let (log_level, logging_config) = match loaded {
        Ok(ref config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };

    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Loglens - Log Search Analysis Tool"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: loglens::domain::Result<LoglensConfig>,
) -> anyhow::Result<i32> {
    if let Commands::ValidateConfig(args) = &cli.command {
        return args.execute(&cli.config).await;
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return Ok(2); // Configuration error exit code
        }
    };

    match &cli.command {
        Commands::Sessions(args) => args.execute(config).await,
        Commands::BodyErrors(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
    }
}
