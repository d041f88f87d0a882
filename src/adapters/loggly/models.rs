//! Search API models
//!
//! Request and response shapes for the `events/iterate` endpoint. These are
//! kept apart from domain records: a page is unpacked into
//! [`Record::Event`](crate::domain::Record::Event)s before it reaches the
//! channel.

use crate::domain::{Record, TimeWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsPage {
    /// Raw events on this page
    pub events: Vec<serde_json::Value>,

    /// Absolute URL of the next page, absent (or empty) on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Total matching events, when the API reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_events: Option<u64>,
}

impl EventsPage {
    /// Next page URL, treating an empty string as absent
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Number of matching events the API claims, falling back to the page length
    pub fn declared_total(&self) -> u64 {
        self.total_events.unwrap_or(self.events.len() as u64)
    }

    /// Moves the events out as records, keeping page order
    pub fn into_records(self) -> Vec<Record> {
        self.events.into_iter().map(Record::Event).collect()
    }
}

/// What to ask the search API for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First page of a time window
    Window(TimeWindow),

    /// A follow-up page from a `next` link
    Next(String),
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRequest::Window(window) => write!(f, "window {window}"),
            PageRequest::Next(url) => write!(f, "next page {url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_with_next_link() {
        let page: EventsPage = serde_json::from_value(json!({
            "events": [{"id": 1}, {"id": 2}],
            "next": "https://company.loggly.com/apiv2/events/iterate?next=abc"
        }))
        .unwrap();

        assert_eq!(
            page.next_url(),
            Some("https://company.loggly.com/apiv2/events/iterate?next=abc")
        );
        assert_eq!(page.declared_total(), 2);
        assert_eq!(page.into_records().len(), 2);
    }

    #[test]
    fn test_empty_next_is_last_page() {
        let page: EventsPage =
            serde_json::from_value(json!({"events": [], "next": ""})).unwrap();
        assert_eq!(page.next_url(), None);
    }

    #[test]
    fn test_missing_events_is_rejected() {
        let page = serde_json::from_value::<EventsPage>(json!({"next": null}));
        assert!(page.is_err());
    }

    #[test]
    fn test_declared_total_prefers_reported_count() {
        let page: EventsPage =
            serde_json::from_value(json!({"events": [{}], "total_events": 5400})).unwrap();
        assert_eq!(page.declared_total(), 5400);
    }
}
