//! Sessions command implementation
//!
//! This module implements the `sessions` command: a windowed search over the
//! configured time range feeding the session analyzer.

use super::exit_code;
use crate::adapters::loggly::LogglyClient;
use crate::config::{LoglensConfig, SessionsConfig};
use crate::core::analyze::SessionAnalyzer;
use crate::core::controller::Controller;
use crate::core::fetch::{FetchPlan, WindowedFetcher};
use crate::domain::format_utc_millis;
use chrono::{DateTime, Duration, Utc};
use clap::Args;

/// Arguments for the sessions command
#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Number of days to analyze, counted back from the end time
    #[arg(long)]
    pub days: Option<i64>,

    /// End of the range (RFC 3339), defaults to now
    #[arg(long)]
    pub end: Option<String>,

    /// Length of one search window in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Number of windows fetched concurrently
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Write per-session counts to this CSV file
    #[arg(short, long)]
    pub output: Option<String>,
}

impl SessionsArgs {
    /// Execute the sessions command
    pub async fn execute(&self, mut config: LoglensConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting sessions command");

        self.apply_overrides(&mut config);
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let loggly = match config.require_loggly() {
            Ok(loggly) => loggly,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let (start, end) = match resolve_range(&config.sessions, Utc::now()) {
            Ok(range) => range,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let plan = match FetchPlan::from_config(start, end, &config.fetch) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let client = match LogglyClient::new(loggly, config.fetch.max_concurrency) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create search client");
                eprintln!("Failed to initialize search client: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        println!(
            "Analyzing sessions from {} to {}",
            format_utc_millis(&start),
            format_utc_millis(&end)
        );

        let controller = Controller::new(WindowedFetcher::new(client, plan), SessionAnalyzer::new())
            .with_channel_capacity(config.fetch.channel_capacity);

        let outcome = match controller.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Session analysis failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        println!();
        for (label, tally) in outcome.report.tallies() {
            println!(
                "{label}: {} items, {} including empty",
                tally.distinct_count(),
                tally.count_including_empty()
            );
        }

        if let Some(ref output) = config.sessions.output {
            if let Err(e) = outcome.report.write_csv(output) {
                eprintln!("Failed to write session report: {e}");
                return Ok(exit_code(&e));
            }
            println!("Session counts written to {output}");
        }

        println!();
        println!("{}", outcome.summary);
        Ok(0)
    }

    fn apply_overrides(&self, config: &mut LoglensConfig) {
        if let Some(days) = self.days {
            tracing::info!(days, "Overriding duration from CLI");
            config.sessions.duration_days = days;
        }
        if let Some(ref end) = self.end {
            tracing::info!(end = %end, "Overriding end time from CLI");
            config.sessions.end_time = Some(end.clone());
        }
        if let Some(interval) = self.interval_secs {
            tracing::info!(interval_secs = interval, "Overriding window interval from CLI");
            config.fetch.interval_seconds = interval;
        }
        if let Some(concurrency) = self.max_concurrency {
            tracing::info!(max_concurrency = concurrency, "Overriding concurrency from CLI");
            config.fetch.max_concurrency = concurrency;
        }
        if let Some(ref output) = self.output {
            config.sessions.output = Some(output.clone());
        }
    }
}

/// Resolves the `[start, end)` range to analyze
///
/// The end is the configured end time, or `now` shifted back by
/// `days_offset` days. The start lies `duration_days` before the end.
pub fn resolve_range(
    sessions: &SessionsConfig,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let end = match sessions.end_time {
        Some(ref end_time) => DateTime::parse_from_rfc3339(end_time)
            .map_err(|e| format!("invalid end time '{end_time}': {e}"))?
            .with_timezone(&Utc),
        None => Duration::try_days(sessions.days_offset)
            .and_then(|offset| now.checked_sub_signed(offset))
            .ok_or_else(|| format!("days offset {} is out of range", sessions.days_offset))?,
    };
    let start = Duration::try_days(sessions.duration_days)
        .and_then(|duration| end.checked_sub_signed(duration))
        .ok_or_else(|| format!("duration of {} days is out of range", sessions.duration_days))?;
    Ok((start, end))
}
