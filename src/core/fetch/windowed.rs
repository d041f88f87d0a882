//! Windowed, concurrent fetching from the remote search API
//!
//! The master range is cut into fixed windows. Up to `max_concurrency`
//! windows are in flight at once; the next window is only started when one
//! finishes. Each window walks its pagination chain in order, pushing every
//! page onto the channel as it arrives. Pages of one window are therefore
//! enqueued in cursor order, while pages of different windows interleave.
//!
//! The first window failure aborts the run: in-flight windows are dropped,
//! the sender goes with them, and the channel closes without an end marker.

use super::retry::{retry_transient, RetryPolicy};
use super::{FetchStats, Fetcher};
use crate::adapters::loggly::{EventSearch, PageRequest};
use crate::config::FetchConfig;
use crate::core::channel::ChannelSender;
use crate::domain::{format_utc_millis, LoglensError, Result, TimeWindow};
use crate::log_window_fetched;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};

/// Range and limits of one windowed fetch
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Inclusive start of the master range
    pub start: DateTime<Utc>,

    /// Exclusive end of the master range
    pub end: DateTime<Utc>,

    /// Window length
    pub interval: Duration,

    /// Windows in flight at once
    pub max_concurrency: usize,

    /// Retry behaviour for every page request
    pub retry: RetryPolicy,
}

impl FetchPlan {
    /// Creates a plan for `[start, end)` with the `[fetch]` settings
    ///
    /// # Errors
    ///
    /// Returns [`LoglensError::Validation`] when the interval does not fit a
    /// `chrono::Duration`.
    pub fn from_config(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config: &FetchConfig,
    ) -> Result<Self> {
        let interval = i64::try_from(config.interval_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                LoglensError::Validation(format!(
                    "fetch interval of {} seconds is out of range",
                    config.interval_seconds
                ))
            })?;

        Ok(Self {
            start,
            end,
            interval,
            max_concurrency: config.max_concurrency,
            retry: RetryPolicy::from_config(config),
        })
    }
}

/// Fetches a time range from an [`EventSearch`] source
///
/// # Example
///
/// ```no_run
/// use loglens::adapters::loggly::LogglyClient;
/// use loglens::config::load_config;
/// use loglens::core::fetch::{FetchPlan, WindowedFetcher};
/// use chrono::{Duration, Utc};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("loglens.toml")?;
/// let client = LogglyClient::new(config.require_loggly()?, config.fetch.max_concurrency)?;
/// let end = Utc::now();
/// let plan = FetchPlan::from_config(end - Duration::days(1), end, &config.fetch)?;
/// let fetcher = WindowedFetcher::new(client, plan);
/// # Ok(())
/// # }
/// ```
pub struct WindowedFetcher<S> {
    source: S,
    plan: FetchPlan,
}

impl<S: EventSearch> WindowedFetcher<S> {
    /// Creates a fetcher over `source`
    pub fn new(source: S, plan: FetchPlan) -> Self {
        Self { source, plan }
    }

    /// The plan this fetcher runs
    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    /// Fetches one window and its pagination chain
    async fn fetch_window(&self, window: TimeWindow, sender: &ChannelSender) -> Result<FetchStats> {
        let page_size = self.source.page_size() as u64;
        let mut stats = FetchStats {
            windows: 1,
            ..Default::default()
        };
        let mut request = PageRequest::Window(window);

        tracing::debug!(window = %window, "Fetching window");

        loop {
            let current = &request;
            let page = retry_transient(&self.plan.retry, current, || {
                self.source.fetch_page(current)
            })
            .await?;
            stats.pages += 1;

            let declared = page.declared_total();
            if declared > page_size {
                stats.warnings += 1;
                tracing::warn!(
                    window = %window,
                    declared_total = declared,
                    page_size = page_size,
                    "Search matched more events than one page holds; use a smaller interval"
                );
            }

            let next = page.next_url().map(str::to_string);
            let records = page.into_records();
            tracing::debug!(window = %window, count = records.len(), "Search data received");
            stats.records += records.len();
            if !records.is_empty() {
                sender.put_batch(records).await?;
            }

            match next {
                Some(url) => request = PageRequest::Next(url),
                None => break,
            }
        }

        log_window_fetched!(window, stats.pages, stats.records);
        Ok(stats)
    }
}

#[async_trait]
impl<S: EventSearch> Fetcher for WindowedFetcher<S> {
    fn name(&self) -> &'static str {
        "search_api"
    }

    async fn fetch(&self, sender: ChannelSender) -> Result<FetchStats> {
        let windows = TimeWindow::partition(self.plan.start, self.plan.end, self.plan.interval)
            .map_err(LoglensError::Validation)?;

        tracing::info!(
            from = %format_utc_millis(&self.plan.start),
            until = %format_utc_millis(&self.plan.end),
            windows = windows.clone().count(),
            interval_secs = self.plan.interval.num_seconds(),
            max_concurrency = self.plan.max_concurrency,
            "Starting windowed fetch"
        );

        let stats = stream::iter(windows)
            .map(|window| self.fetch_window(window, &sender))
            .buffer_unordered(self.plan.max_concurrency.max(1))
            .try_fold(FetchStats::default(), |mut total, window_stats| async move {
                total.absorb(window_stats);
                Ok(total)
            })
            .await?;

        sender.finish().await?;

        tracing::info!(
            windows = stats.windows,
            pages = stats.pages,
            records = stats.records,
            warnings = stats.warnings,
            "Finished data fetch"
        );

        Ok(stats)
    }
}
