//! Records flowing from a source to an analyzer
//!
//! Remote searches yield raw JSON events; bulk CSV exports yield typed rows.
//! Analyzers accept the kinds they understand and reject the rest.

use serde::{Deserialize, Serialize};

/// One unit of data delivered to an analyzer
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A raw event from the log search API
    Event(serde_json::Value),

    /// One row of a body-error CSV export
    BodyError(BodyError),

    /// One row of a daily submission totals CSV export
    DailyTotal(DailyTotal),
}

impl Record {
    /// Short name of the record kind, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Event(_) => "event",
            Record::BodyError(_) => "body_error",
            Record::DailyTotal(_) => "daily_total",
        }
    }
}

/// Error details exported from the log search UI
///
/// Column names follow the export header. Missing columns read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyError {
    /// Event timestamp, e.g. `2023-09-22T17:53:44.362Z`
    #[serde(rename = "Date", default)]
    pub date: String,

    /// Structured error attribute
    #[serde(rename = "@Body.Attributes.metadata.error", default)]
    pub attribute_error: String,

    /// Free-text body message, used when the attribute is empty
    #[serde(rename = "@Body.message", default)]
    pub body_message: String,
}

impl BodyError {
    /// Creates a body error row
    pub fn new(
        date: impl Into<String>,
        attribute_error: impl Into<String>,
        body_message: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            attribute_error: attribute_error.into(),
            body_message: body_message.into(),
        }
    }
}

/// Number of submissions on one day, the denominator of error percentages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Day (or timestamp within the day)
    #[serde(rename = "time", default)]
    pub date: String,

    /// Submission count for the day
    #[serde(rename = "value", default)]
    pub total: u64,
}

impl DailyTotal {
    /// Creates a daily total row
    pub fn new(date: impl Into<String>, total: u64) -> Self {
        Self {
            date: date.into(),
            total,
        }
    }
}
