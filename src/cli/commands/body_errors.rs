//! Body errors command implementation
//!
//! This module implements the `body-errors` command: bulk CSV exports
//! feeding the error category analyzer, which writes three report files.

use super::exit_code;
use crate::config::{BodyErrorsConfig, LoglensConfig};
use crate::core::analyze::BodyErrorAnalyzer;
use crate::core::controller::Controller;
use crate::core::fetch::{CsvFetcher, CsvSource};
use clap::Args;

/// Arguments for the body-errors command
#[derive(Args, Debug)]
pub struct BodyErrorsArgs {
    /// Body-error CSV export to analyze
    #[arg(short, long)]
    pub input: Option<String>,

    /// CSV of daily submission totals (`time,value`)
    #[arg(long)]
    pub daily_totals: Option<String>,

    /// Output file for `error,count`
    #[arg(long)]
    pub errors_output: Option<String>,

    /// Output file for per-day error counts
    #[arg(long)]
    pub daily_counts_output: Option<String>,

    /// Output file for per-day error ratios
    #[arg(long)]
    pub daily_percentages_output: Option<String>,
}

impl BodyErrorsArgs {
    /// Execute the body-errors command
    pub async fn execute(&self, mut config: LoglensConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting body-errors command");

        self.apply_overrides(&mut config);
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let settings = match config.require_body_errors() {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let fetcher = CsvFetcher::new(sources(settings), settings.max_field_bytes);
        let analyzer = BodyErrorAnalyzer::new(settings.group_label.clone());
        let controller =
            Controller::new(fetcher, analyzer).with_channel_capacity(config.fetch.channel_capacity);

        println!("Analyzing body errors from {}", settings.input_csv);

        let outcome = match controller.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("Body error analysis failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        if let Err(e) = outcome.report.write_files(
            &settings.errors_output,
            &settings.daily_counts_output,
            &settings.daily_percentages_output,
        ) {
            eprintln!("Failed to write body error reports: {e}");
            return Ok(exit_code(&e));
        }

        println!();
        println!(
            "{} error categories across {} days",
            outcome.report.errors().len(),
            outcome.report.dates().len()
        );
        println!("  Error counts:      {}", settings.errors_output);
        println!("  Daily counts:      {}", settings.daily_counts_output);
        println!("  Daily percentages: {}", settings.daily_percentages_output);
        println!();
        println!("{}", outcome.summary);
        Ok(0)
    }

    fn apply_overrides(&self, config: &mut LoglensConfig) {
        let any_override = self.input.is_some()
            || self.daily_totals.is_some()
            || self.errors_output.is_some()
            || self.daily_counts_output.is_some()
            || self.daily_percentages_output.is_some();
        if !any_override {
            return;
        }

        let settings = config
            .body_errors
            .get_or_insert_with(BodyErrorsConfig::default);
        if let Some(ref input) = self.input {
            tracing::info!(input = %input, "Overriding input CSV from CLI");
            settings.input_csv = input.clone();
        }
        if let Some(ref totals) = self.daily_totals {
            tracing::info!(daily_totals = %totals, "Overriding daily totals CSV from CLI");
            settings.daily_totals_csv = Some(totals.clone());
        }
        if let Some(ref output) = self.errors_output {
            settings.errors_output = output.clone();
        }
        if let Some(ref output) = self.daily_counts_output {
            settings.daily_counts_output = output.clone();
        }
        if let Some(ref output) = self.daily_percentages_output {
            settings.daily_percentages_output = output.clone();
        }
    }
}

/// Daily totals first, so percentages have their denominators
fn sources(settings: &BodyErrorsConfig) -> Vec<CsvSource> {
    settings
        .daily_totals_csv
        .iter()
        .map(CsvSource::daily_totals)
        .chain(std::iter::once(CsvSource::body_errors(&settings.input_csv)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::CsvKind;

    fn args() -> BodyErrorsArgs {
        BodyErrorsArgs {
            input: None,
            daily_totals: None,
            errors_output: None,
            daily_counts_output: None,
            daily_percentages_output: None,
        }
    }

    #[test]
    fn test_sources_put_daily_totals_first() {
        let settings = BodyErrorsConfig {
            input_csv: "errors.csv".to_string(),
            daily_totals_csv: Some("totals.csv".to_string()),
            ..Default::default()
        };

        let kinds: Vec<CsvKind> = sources(&settings).iter().map(|s| s.kind).collect();

        assert_eq!(kinds, vec![CsvKind::DailyTotals, CsvKind::BodyErrors]);
    }

    #[test]
    fn test_input_override_creates_section() {
        let mut config = LoglensConfig::default();
        let args = BodyErrorsArgs {
            input: Some("export.csv".to_string()),
            ..args()
        };

        args.apply_overrides(&mut config);

        let settings = config.body_errors.unwrap();
        assert_eq!(settings.input_csv, "export.csv");
        assert_eq!(settings.errors_output, "errors.csv");
    }

    #[test]
    fn test_no_overrides_leaves_config_untouched() {
        let mut config = LoglensConfig::default();
        args().apply_overrides(&mut config);
        assert!(config.body_errors.is_none());
    }

    #[tokio::test]
    async fn test_missing_input_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let args = BodyErrorsArgs {
            input: Some(dir.path().join("missing.csv").display().to_string()),
            errors_output: Some(dir.path().join("e.csv").display().to_string()),
            ..args()
        };

        let code = args.execute(LoglensConfig::default()).await.unwrap();

        assert_eq!(code, 5);
        assert!(!dir.path().join("e.csv").exists());
    }
}
