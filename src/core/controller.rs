//! Pipeline controller
//!
//! Runs one fetcher and one analyzer against a bounded channel. The fetch
//! phase runs on the calling task, the drain phase on a spawned task; both
//! run concurrently and the controller waits for both before finalizing the
//! analyzer.
//!
//! Termination does not depend on the happy path:
//!
//! - a failed fetch drops the sender, the drain loop sees the channel close
//!   without an end marker and stops
//! - a failed analyzer drops the receiver, the next `put` fails and the
//!   fetch stops
//!
//! When both phases fail, the error that caused the other one is returned.

use crate::core::analyze::Analyzer;
use crate::core::channel::{bounded, ChannelReceiver, Message};
use crate::core::fetch::Fetcher;
use crate::core::summary::RunSummary;
use crate::domain::{LoglensError, Result};
use std::time::Instant;
use tracing::Instrument;

/// Default number of messages buffered between fetcher and analyzer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Report and counters of a finished run
#[derive(Debug)]
pub struct RunOutcome<R> {
    pub report: R,
    pub summary: RunSummary,
}

/// Wires a fetcher to an analyzer for one run
pub struct Controller<F, A> {
    fetcher: F,
    analyzer: A,
    channel_capacity: usize,
}

impl<F: Fetcher, A: Analyzer> Controller<F, A> {
    /// Create a controller with the default channel capacity
    pub fn new(fetcher: F, analyzer: A) -> Self {
        Self {
            fetcher,
            analyzer,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the channel capacity (backpressure threshold)
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Runs fetch and drain to completion and finalizes the analyzer
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of either phase. The analyzer is not
    /// finalized in that case.
    pub async fn run(self) -> Result<RunOutcome<A::Report>> {
        let Self {
            fetcher,
            analyzer,
            channel_capacity,
        } = self;

        let source = fetcher.name();
        let analyzer_name = analyzer.name();
        let span = tracing::info_span!("pipeline", source, analyzer = analyzer_name);
        let started = Instant::now();

        span.in_scope(|| {
            tracing::info!(channel_capacity, "Starting pipeline");
        });

        let (sender, receiver) = bounded(channel_capacity);
        let drain_task = tokio::spawn(drain(analyzer, receiver).instrument(span.clone()));

        let fetched = fetcher.fetch(sender).instrument(span.clone()).await;
        let drained = match drain_task.await {
            Ok(result) => result,
            Err(e) => Err(LoglensError::Task(format!("analyzer task failed: {e}"))),
        };

        let (stats, (analyzer, consumed)) = match (fetched, drained) {
            (Ok(stats), Ok(drained)) => (stats, drained),
            (Err(fetch_err), Err(drain_err)) if fetch_err.is_channel_closed() => {
                return Err(fail(&span, drain_err))
            }
            (Err(fetch_err), _) => return Err(fail(&span, fetch_err)),
            (Ok(_), Err(drain_err)) => return Err(fail(&span, drain_err)),
        };

        let report = span.in_scope(|| analyzer.finalize())?;
        let summary = RunSummary::new(source, analyzer_name, stats, consumed)
            .with_duration(started.elapsed());
        span.in_scope(|| summary.log_summary());

        Ok(RunOutcome { report, summary })
    }
}

fn fail(span: &tracing::Span, error: LoglensError) -> LoglensError {
    span.in_scope(|| tracing::error!(error = %error, "Pipeline aborted"));
    error
}

/// Feeds every record to the analyzer until the end marker
///
/// Returns the analyzer and the number of records consumed.
async fn drain<A: Analyzer>(
    mut analyzer: A,
    mut receiver: ChannelReceiver,
) -> Result<(A, usize)> {
    let mut consumed = 0;

    while let Some(message) = receiver.get().await {
        match message {
            Message::Batch(records) => {
                for record in records {
                    analyzer.analyze(record)?;
                    consumed += 1;
                }
            }
            Message::Record(record) => {
                analyzer.analyze(record)?;
                consumed += 1;
            }
            Message::End => {
                tracing::debug!(consumed, "End of record stream");
                return Ok((analyzer, consumed));
            }
        }
    }

    Err(LoglensError::ChannelClosed(
        "record stream closed before the end marker".to_string(),
    ))
}
