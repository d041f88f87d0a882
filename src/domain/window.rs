//! Time windows for partitioned fetching
//!
//! A master `[start, end)` range is cut into contiguous, non-overlapping
//! half-open windows of a fixed length. The final window is clipped to the
//! master end so the windows cover the range exactly once.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::fmt;

/// Half-open time interval `[start, end)` fetched as one unit
///
/// # Examples
///
/// ```
/// use loglens::domain::window::TimeWindow;
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2023, 9, 8, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2023, 9, 8, 0, 5, 0).unwrap();
/// let window = TimeWindow::new(start, end).unwrap();
/// assert_eq!(window.from_param(), "2023-09-08T00:00:00.000Z");
/// assert_eq!(window.until_param(), "2023-09-08T00:05:00.000Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window, rejecting empty or inverted intervals
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, String> {
        if start >= end {
            return Err(format!(
                "Time window start {} must be before end {}",
                format_utc_millis(&start),
                format_utc_millis(&end)
            ));
        }
        Ok(Self { start, end })
    }

    /// Inclusive start of the window
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end of the window
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `from` query parameter value
    pub fn from_param(&self) -> String {
        format_utc_millis(&self.start)
    }

    /// `until` query parameter value
    pub fn until_param(&self) -> String {
        format_utc_millis(&self.end)
    }

    /// Partitions `[start, end)` into windows of `interval`
    ///
    /// An empty or inverted range yields no windows. The interval must be
    /// positive.
    ///
    /// # Errors
    ///
    /// Returns an error if `interval` is zero or negative.
    pub fn partition(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Windows, String> {
        if interval <= Duration::zero() {
            return Err(format!(
                "Window interval must be positive, got {}s",
                interval.num_seconds()
            ));
        }
        Ok(Windows {
            next_start: start,
            end,
            interval,
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from_param(), self.until_param())
    }
}

/// Iterator over the windows of a partitioned range
///
/// Windows are produced lazily in ascending order so long ranges don't
/// materialize every window up front.
#[derive(Debug, Clone)]
pub struct Windows {
    next_start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
}

impl Iterator for Windows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let window_end = match start.checked_add_signed(self.interval) {
            Some(candidate) if candidate < self.end => candidate,
            _ => self.end,
        };
        self.next_start = window_end;
        Some(TimeWindow {
            start,
            end: window_end,
        })
    }
}

/// Formats a UTC instant as ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_utc_millis(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
