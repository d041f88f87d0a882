//! Domain error types
//!
//! This module defines the error hierarchy for Loglens. Source-side failures
//! live in [`FetchError`] so the fetch driver can tell transient failures
//! (retried) from fatal ones (abort the run). Third-party error types are
//! converted to strings at the boundary and never leak through the API.

use thiserror::Error;

/// Main Loglens error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum LoglensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised while fetching records from a source
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A record kind reached an analyzer that cannot handle it
    #[error("Invalid record type: {analyzer} cannot analyze {record_kind} records")]
    InvalidRecordType {
        analyzer: &'static str,
        record_kind: &'static str,
    },

    /// The channel closed before the end-of-stream marker arrived
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// A pipeline task failed to complete (panic or cancellation)
    #[error("Pipeline task failed: {0}")]
    Task(String),

    /// Report generation errors
    #[error("Report error: {0}")]
    Report(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Fetch-specific errors
///
/// Errors that occur while pulling records from the remote search API or
/// from a bulk file. These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to reach the remote server
    #[error("Failed to connect to search API: {0}")]
    ConnectionFailed(String),

    /// The server answered with a non-2xx status
    #[error("HTTP error: {status} - {message}")]
    HttpStatus { status: u16, message: String },

    /// The server answered 2xx with a body we cannot use
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A transient failure kept happening until the retry ceiling
    #[error("Fetching {target} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        target: String,
        attempts: usize,
        last_error: String,
    },

    /// A bulk input row could not be turned into a record
    #[error("Malformed record in {source_name} at line {line}: {message}")]
    MalformedRecord {
        source_name: String,
        line: u64,
        message: String,
    },
}

impl FetchError {
    /// Whether this failure may succeed on a later attempt
    ///
    /// Network failures and non-2xx statuses are transient; anything about
    /// the content of a response or a file is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::ConnectionFailed(_) | FetchError::HttpStatus { .. }
        )
    }
}

impl LoglensError {
    /// Whether the error only reports that the channel went away
    ///
    /// When both pipeline phases fail, this kind of error is a consequence of
    /// the other phase failing, never the cause.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, LoglensError::ChannelClosed(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for LoglensError {
    fn from(err: std::io::Error) -> Self {
        LoglensError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for LoglensError {
    fn from(err: serde_json::Error) -> Self {
        LoglensError::Serialization(err.to_string())
    }
}

// Conversion from csv errors (report writing; reading maps to MalformedRecord)
impl From<csv::Error> for LoglensError {
    fn from(err: csv::Error) -> Self {
        LoglensError::Report(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LoglensError {
    fn from(err: toml::de::Error) -> Self {
        LoglensError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loglens_error_display() {
        let err = LoglensError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_fetch_error_conversion() {
        let fetch_err = FetchError::ConnectionFailed("Network error".to_string());
        let err: LoglensError = fetch_err.into();
        assert!(matches!(err, LoglensError::Fetch(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::ConnectionFailed("reset".to_string()).is_transient());
        assert!(FetchError::HttpStatus {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!FetchError::InvalidResponse("bad json".to_string()).is_transient());
        assert!(!FetchError::MalformedRecord {
            source_name: "errors.csv".to_string(),
            line: 3,
            message: "invalid digit".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_retries_exhausted_message_keeps_cause() {
        let err = FetchError::RetriesExhausted {
            target: "window 2023-09-08T00:00:00.000Z".to_string(),
            attempts: 3,
            last_error: "HTTP error: 502 - bad gateway".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_invalid_record_type_display() {
        let err = LoglensError::InvalidRecordType {
            analyzer: "sessions",
            record_kind: "daily_total",
        };
        assert_eq!(
            err.to_string(),
            "Invalid record type: sessions cannot analyze daily_total records"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: LoglensError = io_err.into();
        assert!(matches!(err, LoglensError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: LoglensError = json_err.into();
        assert!(matches!(err, LoglensError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: LoglensError = toml_err.into();
        assert!(matches!(err, LoglensError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_channel_closed_detection() {
        assert!(LoglensError::ChannelClosed("receiver dropped".to_string()).is_channel_closed());
        assert!(!LoglensError::Task("panicked".to_string()).is_channel_closed());
    }
}
