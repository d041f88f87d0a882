//! Logging and observability
//!
//! Structured logging through `tracing`, with JSON file output and rotation
//! when enabled. Pipeline components log inside a `pipeline` span created
//! by the controller, so every line of one run carries the run's analyzer and
//! source.
//!
//! # Example
//!
//! ```no_run
//! use loglens::logging::init_logging;
//! use loglens::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use loglens::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "window [..)", "Connection reset");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $target:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            request = %$target,
            reason = %$reason,
            "Retrying fetch"
        );
    };
}

/// Log a completed window with its page and record counts
///
/// # Example
///
/// ```no_run
/// use loglens::log_window_fetched;
///
/// log_window_fetched!("[2023-09-08T00:00:00.000Z, 2023-09-08T00:05:00.000Z)", 2, 1450);
/// ```
#[macro_export]
macro_rules! log_window_fetched {
    ($window:expr, $pages:expr, $records:expr) => {
        tracing::debug!(
            window = %$window,
            pages = $pages,
            records = $records,
            "Window fetched"
        );
    };
}
