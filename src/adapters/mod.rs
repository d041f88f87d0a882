//! External system integrations for Loglens.
//!
//! - [`loggly`] - paginated log search API (remote event source)
//!
//! Adapters isolate third-party types behind traits so the fetch driver can
//! be tested with scripted sources:
//!
//! ```rust,no_run
//! use loglens::adapters::loggly::LogglyClient;
//! use loglens::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("loglens.toml")?;
//! let loggly = config.require_loggly()?;
//! let client = LogglyClient::new(loggly, config.fetch.max_concurrency)?;
//! # Ok(())
//! # }
//! ```

pub mod loggly;
