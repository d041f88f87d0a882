//! Configuration schema types
//!
//! This module defines the configuration structure for Loglens. Sections for
//! the remote search API and the bulk error analysis are optional; each
//! command checks that the section it needs is present.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main Loglens configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoglensConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote log search API (required by the `sessions` command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loggly: Option<LogglyConfig>,

    /// Fetch driver tuning
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Session analysis settings
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Bulk body-error analysis (required by the `body-errors` command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_errors: Option<BodyErrorsConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LoglensConfig {
    /// Validates the sections that are present
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fetch.validate()?;
        if let Some(ref loggly) = self.loggly {
            loggly.validate()?;
        }
        self.sessions.validate()?;
        if let Some(ref body_errors) = self.body_errors {
            body_errors.validate()?;
        }
        self.logging.validate()?;
        Ok(())
    }

    /// Returns the remote search section or a presence error
    pub fn require_loggly(&self) -> Result<&LogglyConfig, String> {
        self.loggly
            .as_ref()
            .ok_or_else(|| "[loggly] section is required for session analysis".to_string())
    }

    /// Returns the body-error section or a presence error
    pub fn require_body_errors(&self) -> Result<&BodyErrorsConfig, String> {
        self.body_errors
            .as_ref()
            .ok_or_else(|| "[body_errors] section is required for error analysis".to_string())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Remote log search API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogglyConfig {
    /// Base URI of the API, e.g. `https://company.loggly.com/apiv2`
    pub base_url: String,

    /// Search expression sent as `q`
    pub query: String,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Source group; sent as `source_group` when non-empty
    #[serde(default)]
    pub source_group: Option<String>,

    /// Maximum records per page (`size`); the API caps this at 1000
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl Default for LogglyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/apiv2".to_string(),
            query: "*".to_string(),
            token: None,
            source_group: None,
            page_size: default_page_size(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl LogglyConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("loggly.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("loggly.base_url must start with http:// or https://".to_string());
        }

        if self.query.trim().is_empty() {
            return Err("loggly.query cannot be empty".to_string());
        }

        if self
            .token
            .as_ref()
            .map(|t| t.expose_secret().is_empty())
            .unwrap_or(true)
        {
            return Err("loggly.token cannot be empty".to_string());
        }

        if self.page_size == 0 {
            return Err("loggly.page_size must be greater than 0".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("loggly.timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Fetch driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Length of each time window in seconds
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Maximum windows fetched concurrently
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Attempts per request before the run aborts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Messages buffered between fetcher and analyzer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl FetchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.interval_seconds == 0 {
            return Err("fetch.interval_seconds must be greater than 0".to_string());
        }

        if self.max_concurrency == 0 {
            return Err("fetch.max_concurrency must be greater than 0".to_string());
        }

        if self.max_retries == 0 {
            return Err("fetch.max_retries must be greater than 0".to_string());
        }

        if self.channel_capacity == 0 {
            return Err("fetch.channel_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Session analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Number of days to look back from the end time
    #[serde(default = "default_duration_days")]
    pub duration_days: i64,

    /// Days to shift the end time back from now
    #[serde(default)]
    pub days_offset: i64,

    /// Fixed end time (RFC 3339); defaults to now
    #[serde(default)]
    pub end_time: Option<String>,

    /// Optional `sid,all,psid,channel` CSV output
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            duration_days: default_duration_days(),
            days_offset: 0,
            end_time: None,
            output: None,
        }
    }
}

impl SessionsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.duration_days <= 0 {
            return Err("sessions.duration_days must be greater than 0".to_string());
        }

        if self.days_offset < 0 {
            return Err("sessions.days_offset cannot be negative".to_string());
        }

        if let Some(ref end_time) = self.end_time {
            chrono::DateTime::parse_from_rfc3339(end_time)
                .map_err(|e| format!("sessions.end_time '{end_time}' is not RFC 3339: {e}"))?;
        }

        Ok(())
    }
}

/// Body-error analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyErrorsConfig {
    /// Body-error CSV export
    pub input_csv: String,

    /// Optional daily submission totals CSV (`time,value`)
    #[serde(default)]
    pub daily_totals_csv: Option<String>,

    /// `error,count` output
    #[serde(default = "default_errors_output")]
    pub errors_output: String,

    /// Per-day count output
    #[serde(default = "default_daily_counts_output")]
    pub daily_counts_output: String,

    /// Per-day percentage output
    #[serde(default = "default_daily_percentages_output")]
    pub daily_percentages_output: String,

    /// First column header of the daily outputs
    #[serde(default = "default_group_label")]
    pub group_label: String,

    /// Largest accepted CSV field in bytes
    #[serde(default = "default_max_field_bytes")]
    pub max_field_bytes: usize,
}

impl Default for BodyErrorsConfig {
    fn default() -> Self {
        Self {
            input_csv: "body_errors.csv".to_string(),
            daily_totals_csv: None,
            errors_output: default_errors_output(),
            daily_counts_output: default_daily_counts_output(),
            daily_percentages_output: default_daily_percentages_output(),
            group_label: default_group_label(),
            max_field_bytes: default_max_field_bytes(),
        }
    }
}

impl BodyErrorsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.input_csv.trim().is_empty() {
            return Err("body_errors.input_csv cannot be empty".to_string());
        }

        if let Some(ref totals) = self.daily_totals_csv {
            if totals.trim().is_empty() {
                return Err("body_errors.daily_totals_csv cannot be empty when set".to_string());
            }
        }

        for (name, value) in [
            ("errors_output", &self.errors_output),
            ("daily_counts_output", &self.daily_counts_output),
            ("daily_percentages_output", &self.daily_percentages_output),
        ] {
            if value.trim().is_empty() {
                return Err(format!("body_errors.{name} cannot be empty"));
            }
        }

        if self.max_field_bytes == 0 {
            return Err("body_errors.max_field_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_interval_seconds() -> u64 {
    300
}

fn default_max_concurrency() -> usize {
    8
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_channel_capacity() -> usize {
    64
}

fn default_duration_days() -> i64 {
    30
}

fn default_errors_output() -> String {
    "errors.csv".to_string()
}

fn default_daily_counts_output() -> String {
    "error_daily_counts.csv".to_string()
}

fn default_daily_percentages_output() -> String {
    "error_daily_percentages.csv".to_string()
}

fn default_group_label() -> String {
    "error type/datetime".to_string()
}

fn default_max_field_bytes() -> usize {
    100_000_000
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn loggly() -> LogglyConfig {
        LogglyConfig {
            token: Some(secret_string("token-123".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoglensConfig::default().validate().is_ok());
    }

    #[test]
    fn test_fetch_defaults() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.interval_seconds, 300);
        assert_eq!(fetch.max_concurrency, 8);
        assert_eq!(fetch.max_retries, 3);
        assert_eq!(fetch.retry_delay_ms, 1000);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = LoglensConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_loggly_requires_token() {
        let mut config = LoglensConfig {
            loggly: Some(LogglyConfig::default()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("token"));

        config.loggly = Some(loggly());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loggly_base_url_scheme() {
        let mut section = loggly();
        section.base_url = "company.loggly.com".to_string();
        assert!(section.validate().unwrap_err().contains("http"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = LoglensConfig::default();
        config.fetch.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = LoglensConfig::default();
        config.fetch.max_retries = 0;
        assert!(config.validate().unwrap_err().contains("max_retries"));
    }

    #[test]
    fn test_sessions_end_time_must_parse() {
        let mut config = LoglensConfig::default();
        config.sessions.end_time = Some("yesterday".to_string());
        assert!(config.validate().is_err());

        config.sessions.end_time = Some("2023-04-18T15:00:00-07:00".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_sections() {
        let config = LoglensConfig::default();
        assert!(config.require_loggly().is_err());
        assert!(config.require_body_errors().is_err());
    }

    #[test]
    fn test_body_errors_outputs_must_be_present() {
        let mut section = BodyErrorsConfig::default();
        section.daily_counts_output = " ".to_string();
        assert!(section.validate().unwrap_err().contains("daily_counts_output"));
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = LoglensConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
