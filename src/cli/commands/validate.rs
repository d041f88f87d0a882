//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Loglens configuration.

use super::load_settings;
use crate::config::LoglensConfig;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration: {config_path}");
        println!();

        // Loading validates every section that is present
        let config = match load_settings(config_path) {
            Ok(c) => {
                println!("Configuration is valid");
                c
            }
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("{}", describe(&config));
        Ok(0)
    }
}

/// Human-readable summary of the settings, without secrets
fn describe(config: &LoglensConfig) -> String {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
    ];

    match config.loggly {
        Some(ref loggly) => {
            lines.push(format!("  Search API: {}", loggly.base_url));
            lines.push(format!("  Query: {}", loggly.query));
            lines.push(format!(
                "  Source Group: {}",
                loggly.source_group.as_deref().unwrap_or("(none)")
            ));
            lines.push(format!(
                "  Token: {}",
                if loggly.token.is_some() { "set" } else { "not set" }
            ));
            lines.push(format!("  Page Size: {}", loggly.page_size));
        }
        None => lines.push("  Search API: not configured".to_string()),
    }

    lines.push(format!("  Window: {}s", config.fetch.interval_seconds));
    lines.push(format!("  Max Concurrency: {}", config.fetch.max_concurrency));
    lines.push(format!(
        "  Retries: {} attempts, {}ms apart",
        config.fetch.max_retries, config.fetch.retry_delay_ms
    ));
    lines.push(format!("  Channel Capacity: {}", config.fetch.channel_capacity));
    lines.push(format!("  Session Days: {}", config.sessions.duration_days));

    match config.body_errors {
        Some(ref body_errors) => {
            lines.push(format!("  Body Error Input: {}", body_errors.input_csv));
            if let Some(ref totals) = body_errors.daily_totals_csv {
                lines.push(format!("  Daily Totals: {totals}"));
            }
        }
        None => lines.push("  Body Error Input: not configured".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, LogglyConfig};
    use std::io::Write;

    #[test]
    fn test_describe_never_prints_token() {
        let config = LoglensConfig {
            loggly: Some(LogglyConfig {
                token: Some(secret_string("super-secret".to_string())),
                ..Default::default()
            }),
            ..Default::default()
        };

        let text = describe(&config);

        assert!(text.contains("Token: set"));
        assert!(!text.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_invalid_file_returns_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nmax_concurrency = 0").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file_returns_success() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[loggly]\nbase_url = \"https://example.com/apiv2\"\nquery = \"*\"\ntoken = \"t\""
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(code, 0);
    }
}
