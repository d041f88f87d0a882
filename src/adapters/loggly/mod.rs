//! Log search API adapter
//!
//! This module provides the integration with the paginated log search API:
//! the HTTP client, the [`EventSearch`] seam used by the windowed fetcher,
//! and the wire models.

pub mod client;
pub mod models;

pub use client::{EventSearch, LogglyClient};
pub use models::{EventsPage, PageRequest};
