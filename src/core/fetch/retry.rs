//! Fixed-delay retry for transient fetch failures

use crate::config::FetchConfig;
use crate::domain::FetchError;
use crate::log_retry_attempt;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, at least one
    pub max_attempts: usize,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; zero attempts is raised to one
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Builds the policy from the `[fetch]` section
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// Only [`FetchError::is_transient`] failures are retried. After the last
/// attempt the failure is returned as [`FetchError::RetriesExhausted`] naming
/// `target` and carrying the last cause.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    target: &(dyn Display + Sync),
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                if attempt >= policy.max_attempts {
                    tracing::error!(
                        attempts = attempt,
                        request = %target,
                        error = %e,
                        "Giving up after repeated failures"
                    );
                    return Err(FetchError::RetriesExhausted {
                        target: target.to_string(),
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                log_retry_attempt!(attempt, policy.max_attempts, target, e);
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
