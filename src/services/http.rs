//! Pooled HTTP transport with a fixed timeout and retry on gateway errors.
//!
//! One `RetryingClient` is built at startup and shared by every metadata call,
//! so connections are reused across requests.

use reqwest::{header::HeaderMap, Response, StatusCode};
use std::time::Duration;

use crate::error::AppResult;

/// Longest single wait between attempts
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);

const MAX_BACKOFF_EXPONENT: u32 = 16;

/// When and how often a request is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Seconds; the n-th retry waits `backoff_factor * 2^(n-2)`, the first waits nothing
    pub backoff_factor: f64,
    /// Statuses that trigger a retry
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 1.0,
            status_forcelist: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = (retry - 2).min(MAX_BACKOFF_EXPONENT) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(seconds.max(0.0))
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.status_forcelist.contains(&status.as_u16())
    }
}

#[derive(Clone)]
pub struct RetryingClient {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, policy })
    }

    /// GET with retries
    ///
    /// A forcelisted status is retried while attempts remain; after that the
    /// last response is returned as-is, so callers must still check the status.
    /// Connection errors and timeouts are retried the same way and surface as
    /// `AppError::HttpClient` once the budget is spent.
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let mut attempt = 1;

        loop {
            let result = self
                .client
                .get(url)
                .query(query)
                .headers(headers.clone())
                .send()
                .await;

            let retries_left = attempt < self.policy.max_attempts;

            match result {
                Ok(response) if retries_left && self.policy.should_retry_status(response.status()) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        status = %response.status(),
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request after server error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if retries_left && (e.is_connect() || e.is_timeout()) => {
                    // The query string carries the API key
                    let e = e.without_url();
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request after transport error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }

            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.should_retry_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(policy.should_retry_status(StatusCode::GATEWAY_TIMEOUT));
        assert!(!policy.should_retry_status(StatusCode::NOT_FOUND));
        assert!(!policy.should_retry_status(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_backoff_sequence() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(2), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 2000,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(9), Duration::from_secs(120));
        assert_eq!(policy.backoff(1100), MAX_BACKOFF);

        let infinite = RetryPolicy {
            backoff_factor: f64::INFINITY,
            ..RetryPolicy::default()
        };
        assert_eq!(infinite.backoff(2), MAX_BACKOFF);

        let nan = RetryPolicy {
            backoff_factor: f64::NAN,
            ..RetryPolicy::default()
        };
        assert_eq!(nan.backoff(2), Duration::ZERO);
    }

    #[test]
    fn test_zero_factor_never_sleeps() {
        let policy = RetryPolicy {
            backoff_factor: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(3), Duration::ZERO);
    }
}
