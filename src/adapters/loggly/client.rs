//! Log search API client
//!
//! This module provides the HTTP client for the `events/iterate` endpoint and
//! the [`EventSearch`] trait the windowed fetcher is written against. One call
//! to [`EventSearch::fetch_page`] is exactly one HTTP request; retrying is
//! the fetch driver's job.

use super::models::{EventsPage, PageRequest};
use crate::config::{LogglyConfig, SecretString};
use crate::domain::{FetchError, LoglensError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Largest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Source of search result pages
///
/// Implemented by [`LogglyClient`]; tests substitute scripted sources.
#[async_trait]
pub trait EventSearch: Send + Sync {
    /// Performs one request for one page
    ///
    /// # Errors
    ///
    /// Connection failures and non-2xx statuses come back as transient
    /// [`FetchError`]s; an unusable body as [`FetchError::InvalidResponse`].
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<EventsPage, FetchError>;

    /// Page-size ceiling sent with each window request
    fn page_size(&self) -> usize;
}

/// HTTP client for the log search API
///
/// # Example
///
/// ```no_run
/// use loglens::adapters::loggly::{EventSearch, LogglyClient, PageRequest};
/// use loglens::config::{secret_string, LogglyConfig};
/// use loglens::domain::TimeWindow;
/// use chrono::{Duration, Utc};
///
/// # async fn example() -> loglens::domain::Result<()> {
/// let config = LogglyConfig {
///     base_url: "https://company.loggly.com/apiv2".to_string(),
///     query: "*".to_string(),
///     token: Some(secret_string("token".to_string())),
///     ..Default::default()
/// };
/// let client = LogglyClient::new(&config, 8)?;
///
/// let end = Utc::now();
/// let window = TimeWindow::new(end - Duration::minutes(5), end).unwrap();
/// let page = client.fetch_page(&PageRequest::Window(window)).await?;
/// println!("{} events", page.events.len());
/// # Ok(())
/// # }
/// ```
pub struct LogglyClient {
    client: Client,
    base_url: String,
    query: String,
    source_group: Option<String>,
    page_size: usize,
    token: SecretString,
}

impl LogglyClient {
    /// Create a client from configuration
    ///
    /// `max_connections` caps idle pooled connections per host, matching the
    /// fetch concurrency.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is configured or the HTTP
    /// client cannot be built.
    pub fn new(config: &LogglyConfig, max_connections: usize) -> Result<Self> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| LoglensError::Configuration("loggly.token is not set".to_string()))?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_max_idle_per_host(max_connections.max(1))
            .build()
            .map_err(|e| {
                LoglensError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            query: config.query.clone(),
            source_group: config
                .source_group
                .clone()
                .filter(|group| !group.trim().is_empty()),
            page_size: config.page_size,
            token,
        })
    }

    /// Base URL of the search API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn iterate_url(&self) -> String {
        format!("{}/events/iterate", self.base_url)
    }

    fn window_params(&self, request: &PageRequest) -> Vec<(&'static str, String)> {
        let PageRequest::Window(window) = request else {
            return Vec::new();
        };
        let mut params = vec![
            ("q", self.query.clone()),
            ("size", self.page_size.to_string()),
            ("from", window.from_param()),
            ("until", window.until_param()),
        ];
        if let Some(ref group) = self.source_group {
            params.push(("source_group", group.clone()));
        }
        params
    }
}

#[async_trait]
impl EventSearch for LogglyClient {
    async fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> std::result::Result<EventsPage, FetchError> {
        let builder = match request {
            PageRequest::Window(_) => self
                .client
                .get(self.iterate_url())
                .query(&self.window_params(request)),
            PageRequest::Next(url) => self.client.get(url),
        };

        tracing::trace!(request = %request, "Requesting search page");

        let response = builder
            .header(
                AUTHORIZATION,
                format!("bearer {}", self.token.expose_secret().as_ref()),
            )
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}
