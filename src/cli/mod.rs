//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Loglens using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Loglens - log search analysis
#[derive(Parser, Debug)]
#[command(name = "loglens")]
#[command(version, about, long_about = None)]
#[command(author = "Loglens Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "loglens.toml", env = "LOGLENS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOGLENS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count distinct sessions over a time range of search events
    Sessions(commands::sessions::SessionsArgs),

    /// Categorize exported body errors per day
    BodyErrors(commands::body_errors::BodyErrorsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
