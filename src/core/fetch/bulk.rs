//! Sequential CSV fetching for exported log data
//!
//! Sources are read one after another, rows in file order, each row pushed
//! as a single record. Reading runs on a blocking thread; the channel's
//! blocking `put` provides the backpressure. Any I/O or shape problem is
//! fatal and nothing more is enqueued after it.

use super::{FetchStats, Fetcher};
use crate::core::channel::ChannelSender;
use crate::domain::{BodyError, DailyTotal, FetchError, LoglensError, Record, Result};
use async_trait::async_trait;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Row layout of a CSV source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvKind {
    /// `Date`, `@Body.Attributes.metadata.error`, `@Body.message`
    BodyErrors,

    /// `time`, `value`
    DailyTotals,
}

impl CsvKind {
    fn parse_row(&self, row: &StringRecord, headers: &StringRecord) -> csv::Result<Record> {
        Ok(match self {
            CsvKind::BodyErrors => Record::BodyError(row.deserialize::<BodyError>(Some(headers))?),
            CsvKind::DailyTotals => {
                Record::DailyTotal(row.deserialize::<DailyTotal>(Some(headers))?)
            }
        })
    }
}

/// One CSV file and its row layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSource {
    pub path: PathBuf,
    pub kind: CsvKind,
}

impl CsvSource {
    pub fn body_errors(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: CsvKind::BodyErrors,
        }
    }

    pub fn daily_totals(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: CsvKind::DailyTotals,
        }
    }
}

/// Reads one or more CSV sources into a single record stream
///
/// All sources share one end marker, posted after the last row of the last
/// source.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    sources: Vec<CsvSource>,
    max_field_bytes: usize,
}

impl CsvFetcher {
    /// Creates a fetcher over `sources`, read in the given order
    pub fn new(sources: Vec<CsvSource>, max_field_bytes: usize) -> Self {
        Self {
            sources,
            max_field_bytes,
        }
    }

    pub fn sources(&self) -> &[CsvSource] {
        &self.sources
    }
}

#[async_trait]
impl Fetcher for CsvFetcher {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch(&self, sender: ChannelSender) -> Result<FetchStats> {
        let sources = self.sources.clone();
        let max_field_bytes = self.max_field_bytes;
        let span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            span.in_scope(|| -> Result<FetchStats> {
                let mut stats = FetchStats::default();
                for source in &sources {
                    stats.records += read_source(source, max_field_bytes, &sender)?;
                }
                sender.blocking_finish()?;
                tracing::info!(
                    sources = sources.len(),
                    records = stats.records,
                    "Finished reading CSV sources"
                );
                Ok(stats)
            })
        })
        .await
        .map_err(|e| LoglensError::Task(format!("CSV reader task failed: {e}")))?
    }
}

/// Streams every row of `source` onto `sender`, returning the row count
fn read_source(
    source: &CsvSource,
    max_field_bytes: usize,
    sender: &ChannelSender,
) -> Result<usize> {
    let source_name = source.path.display().to_string();
    tracing::info!(path = %source_name, kind = ?source.kind, "Reading CSV source");

    let file = File::open(&source.path)
        .map_err(|e| LoglensError::Io(format!("Failed to open {source_name}: {e}")))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| malformed(&source.path, 1, e.to_string()))?
        .clone();

    let mut row = StringRecord::new();
    let mut count = 0;
    loop {
        let more = reader.read_record(&mut row).map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(&source.path, line, e.to_string())
        })?;
        if !more {
            break;
        }

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if let Some(field) = row.iter().find(|f| f.len() > max_field_bytes) {
            return Err(malformed(
                &source.path,
                line,
                format!(
                    "field of {} bytes exceeds the {max_field_bytes} byte limit",
                    field.len()
                ),
            ));
        }

        let record = source
            .kind
            .parse_row(&row, &headers)
            .map_err(|e| malformed(&source.path, line, e.to_string()))?;
        sender.blocking_put_record(record)?;
        count += 1;
    }

    tracing::debug!(path = %source_name, rows = count, "CSV source read");
    Ok(count)
}

fn malformed(path: &Path, line: u64, message: String) -> LoglensError {
    FetchError::MalformedRecord {
        source_name: path.display().to_string(),
        line,
        message,
    }
    .into()
}
