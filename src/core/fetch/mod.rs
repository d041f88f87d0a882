//! Fetch drivers
//!
//! A fetcher owns the producing half of the record channel for one run. It
//! pushes everything it reads and, on success, posts the end marker exactly
//! once by finishing the sender. On a fatal error it returns the error and
//! drops the sender, which closes the channel so the analyzer side stops
//! waiting.
//!
//! - [`windowed::WindowedFetcher`] - remote search, time-partitioned,
//!   concurrent, retrying, following pagination links
//! - [`bulk::CsvFetcher`] - local CSV exports, sequential, no retries

pub mod bulk;
pub mod retry;
pub mod windowed;

pub use bulk::{CsvFetcher, CsvKind, CsvSource};
pub use retry::{retry_transient, RetryPolicy};
pub use windowed::{FetchPlan, WindowedFetcher};

use crate::core::channel::ChannelSender;
use crate::domain::Result;
use async_trait::async_trait;

/// Producer side of a pipeline run
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Short source name for logs and run summaries
    fn name(&self) -> &'static str;

    /// Reads all data onto `sender` and finishes it
    ///
    /// # Errors
    ///
    /// Any error is fatal for the run. The sender is dropped without the end
    /// marker in that case.
    async fn fetch(&self, sender: ChannelSender) -> Result<FetchStats>;
}

/// Counters reported by a fetcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Time windows completed (remote sources)
    pub windows: usize,

    /// Pages received (remote sources)
    pub pages: usize,

    /// Records enqueued
    pub records: usize,

    /// Data-shape warnings raised
    pub warnings: usize,
}

impl FetchStats {
    /// Adds another set of counters into this one
    pub fn absorb(&mut self, other: FetchStats) {
        self.windows += other.windows;
        self.pages += other.pages;
        self.records += other.records;
        self.warnings += other.warnings;
    }
}
