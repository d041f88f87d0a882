//! Core pipeline logic for Loglens.
//!
//! # Modules
//!
//! - [`channel`] - Bounded record channel with an end-of-stream marker
//! - [`fetch`] - Fetch drivers (windowed remote search, bulk CSV)
//! - [`analyze`] - Analyzers turning a record stream into a report
//! - [`controller`] - Runs a fetcher and an analyzer concurrently
//! - [`summary`] - Run counters
//!
//! # Pipeline
//!
//! 1. **Fetch**: the fetcher pushes records onto the channel, then the end marker
//! 2. **Drain**: a spawned task feeds each record to the analyzer
//! 3. **Join**: the controller waits for both phases
//! 4. **Finalize**: the analyzer builds its report
//!
//! # Example
//!
//! ```rust,no_run
//! use loglens::core::analyze::BodyErrorAnalyzer;
//! use loglens::core::controller::Controller;
//! use loglens::core::fetch::{CsvFetcher, CsvSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = CsvFetcher::new(
//!     vec![
//!         CsvSource::daily_totals("daily_totals.csv"),
//!         CsvSource::body_errors("errors_export.csv"),
//!     ],
//!     100_000_000,
//! );
//! let outcome = Controller::new(fetcher, BodyErrorAnalyzer::default())
//!     .run()
//!     .await?;
//!
//! outcome.report.write_files(
//!     "errors.csv",
//!     "error_daily_counts.csv",
//!     "error_daily_percentages.csv",
//! )?;
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod channel;
pub mod controller;
pub mod fetch;
pub mod summary;
