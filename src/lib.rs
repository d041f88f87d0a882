// Loglens - Log Search Analysis Tool
// Copyright (c) 2025 Loglens Contributors
// Licensed under the MIT License

//! # Loglens - Log Search Analysis
//!
//! Loglens pulls time-bounded event data from a paginated log search API (or
//! from exported CSV files), streams it through a bounded channel into an
//! analyzer, and writes summarized reports.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** search results window by window, concurrently, with retries
//! - **Reading** bulk CSV exports row by row
//! - **Analyzing** records as they arrive (session counts, error categories)
//! - **Reporting** results as CSV files and run summaries
//!
//! ## Architecture
//!
//! Loglens follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline logic (channel, fetchers, analyzers, controller)
//! - [`adapters`] - External integrations (log search API)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loglens::adapters::loggly::LogglyClient;
//! use loglens::config::load_config;
//! use loglens::core::analyze::SessionAnalyzer;
//! use loglens::core::controller::Controller;
//! use loglens::core::fetch::{FetchPlan, WindowedFetcher};
//! use chrono::{Duration, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("loglens.toml")?;
//!     let client = LogglyClient::new(config.require_loggly()?, config.fetch.max_concurrency)?;
//!
//!     let end = Utc::now();
//!     let plan = FetchPlan::from_config(end - Duration::days(7), end, &config.fetch)?;
//!     let outcome = Controller::new(WindowedFetcher::new(client, plan), SessionAnalyzer::new())
//!         .with_channel_capacity(config.fetch.channel_capacity)
//!         .run()
//!         .await?;
//!
//!     println!("{} sessions", outcome.report.all.distinct_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Loglens uses the [`domain::LoglensError`] type for all errors:
//!
//! ```rust,no_run
//! use loglens::domain::LoglensError;
//!
//! fn example() -> Result<(), LoglensError> {
//!     let config = loglens::config::load_config("loglens.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Loglens uses structured logging with the `tracing` crate. Every pipeline
//! run logs inside a `pipeline` span naming its source and analyzer.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
