//! Run summary and reporting
//!
//! This module defines the counters reported after a pipeline run.

use crate::core::fetch::FetchStats;
use std::time::Duration;

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Fetcher name
    pub source: &'static str,

    /// Analyzer name
    pub analyzer: &'static str,

    /// Time windows fetched (remote sources)
    pub windows: usize,

    /// Pages fetched (remote sources)
    pub pages: usize,

    /// Records put on the channel
    pub records_fetched: usize,

    /// Records handed to the analyzer
    pub records_consumed: usize,

    /// Data-shape warnings raised while fetching
    pub warnings: usize,

    /// Wall time of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a summary from fetch and drain counters
    pub fn new(
        source: &'static str,
        analyzer: &'static str,
        stats: FetchStats,
        records_consumed: usize,
    ) -> Self {
        Self {
            source,
            analyzer,
            windows: stats.windows,
            pages: stats.pages,
            records_fetched: stats.records,
            records_consumed,
            warnings: stats.warnings,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether every fetched record reached the analyzer
    pub fn is_complete(&self) -> bool {
        self.records_fetched == self.records_consumed
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            source = self.source,
            analyzer = self.analyzer,
            windows = self.windows,
            pages = self.pages,
            records_fetched = self.records_fetched,
            records_consumed = self.records_consumed,
            duration_ms = self.duration.as_millis() as u64,
            "Pipeline completed"
        );

        if self.warnings > 0 {
            tracing::warn!(
                warnings = self.warnings,
                "Pipeline completed with warnings, some windows may be truncated"
            );
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Source:           {}", self.source)?;
        writeln!(f, "Analyzer:         {}", self.analyzer)?;
        if self.windows > 0 {
            writeln!(f, "Windows:          {}", self.windows)?;
            writeln!(f, "Pages:            {}", self.pages)?;
        }
        writeln!(f, "Records fetched:  {}", self.records_fetched)?;
        writeln!(f, "Records analyzed: {}", self.records_consumed)?;
        if self.warnings > 0 {
            writeln!(f, "Warnings:         {}", self.warnings)?;
        }
        write!(f, "Duration:         {:.2}s", self.duration.as_secs_f64())
    }
}
