//! Record analyzers
//!
//! An analyzer is the consuming end of a pipeline run. The controller feeds
//! it every record in arrival order from a single task, then calls
//! [`Analyzer::finalize`] once after the end marker. Aggregate state is only
//! ever touched by that task, so analyzers hold plain maps and no locks.
//!
//! Arrival order across time windows is not chronological; analyzers only
//! keep order-independent tallies.
//!
//! - [`SessionAnalyzer`] - distinct session ids, cross-tabulated by device id
//! - [`BodyErrorAnalyzer`] - error categories per day, with daily percentages

pub mod body_error;
pub mod session;

pub use body_error::{
    extract_date, format_percent, get_percent, normalize_error, BodyErrorAnalyzer,
    BodyErrorReport,
};
pub use session::{SessionAnalyzer, SessionReport, SessionTally};

use crate::domain::{Record, Result};

/// Consumer side of a pipeline run
pub trait Analyzer: Send + 'static {
    /// What [`finalize`](Self::finalize) produces
    type Report: Send + 'static;

    /// Short name for logs and errors
    fn name(&self) -> &'static str;

    /// Consumes one record
    ///
    /// # Errors
    ///
    /// Returns [`LoglensError::InvalidRecordType`](crate::domain::LoglensError::InvalidRecordType)
    /// for a record kind this analyzer does not handle. The run aborts.
    fn analyze(&mut self, record: Record) -> Result<()>;

    /// Builds the report from everything analyzed
    ///
    /// Takes `self` by value, so it runs at most once.
    fn finalize(self) -> Result<Self::Report>;
}
