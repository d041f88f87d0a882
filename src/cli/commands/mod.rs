//! CLI command implementations
//!
//! Commands return a process exit code:
//!
//! - `0` success
//! - `2` configuration error
//! - `4` connection or initialization error
//! - `5` fatal error

pub mod body_errors;
pub mod sessions;
pub mod validate;

use crate::config::{load_config, load_from_env, LoglensConfig};
use crate::domain::{FetchError, LoglensError, Result};
use std::path::Path;

/// Loads the configuration file, or the environment alone when it is missing
pub fn load_settings(config_path: &str) -> Result<LoglensConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::debug!(
            config_path = %config_path,
            "Configuration file not found, using environment"
        );
        load_from_env()
    }
}

/// Exit code for an error that ended a command
pub fn exit_code(error: &LoglensError) -> i32 {
    match error {
        LoglensError::Configuration(_) | LoglensError::Validation(_) => 2,
        LoglensError::Fetch(
            FetchError::ConnectionFailed(_)
            | FetchError::HttpStatus { .. }
            | FetchError::RetriesExhausted { .. },
        ) => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&LoglensError::Configuration("x".into())), 2);
        assert_eq!(
            exit_code(&LoglensError::Fetch(FetchError::RetriesExhausted {
                target: "w".into(),
                attempts: 3,
                last_error: "reset".into(),
            })),
            4
        );
        assert_eq!(
            exit_code(&LoglensError::Fetch(FetchError::MalformedRecord {
                source_name: "a.csv".into(),
                line: 2,
                message: "bad".into(),
            })),
            5
        );
        assert_eq!(
            exit_code(&LoglensError::InvalidRecordType {
                analyzer: "sessions",
                record_kind: "body_error"
            }),
            5
        );
    }
}
