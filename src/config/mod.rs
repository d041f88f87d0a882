//! Configuration management for Loglens.
//!
//! Loglens reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `LOGLENS_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Presence-oriented validation
//!
//! When no file exists the same settings can come from the environment
//! alone (see [`load_from_env`]).
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [loggly]
//! base_url = "https://company.loggly.com/apiv2"
//! query = "json.req.path:\"/session\""
//! token = "${LOGGLY_TOKEN}"
//! source_group = "production"
//!
//! [fetch]
//! interval_seconds = 300
//! max_concurrency = 8
//! max_retries = 3
//!
//! [sessions]
//! duration_days = 30
//!
//! [body_errors]
//! input_csv = "exports/body_errors.csv"
//! daily_totals_csv = "exports/daily_totals.csv"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_from_env};
pub use schema::{
    ApplicationConfig, BodyErrorsConfig, FetchConfig, LoggingConfig, LoglensConfig, LogglyConfig,
    SessionsConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
