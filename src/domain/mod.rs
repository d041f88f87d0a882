//! Domain models and types for Loglens.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Time windows** ([`TimeWindow`]) used to partition remote searches
//! - **Records** ([`Record`], [`BodyError`], [`DailyTotal`]) carried to analyzers
//! - **Error types** ([`LoglensError`], [`FetchError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LoglensError>`]:
//!
//! ```rust
//! use loglens::domain::{LoglensError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = loglens::config::load_config("loglens.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;
pub mod window;

// Re-export commonly used types for convenience
pub use errors::{FetchError, LoglensError};
pub use record::{BodyError, DailyTotal, Record};
pub use result::Result;
pub use window::{format_utc_millis, TimeWindow, Windows};
