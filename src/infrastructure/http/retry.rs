use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

use crate::domain::models::RetryConfig;

/// Retry policy with exponential backoff for inference requests
///
/// Backoff for the n-th retry is `backoff_factor * 2^(n-1)`, capped at
/// `max_backoff`: with the default 1s factor that is 1s, 2s, 4s, 8s, 16s.
///
/// # Retry Decision
/// - Retry on: configured statuses (default 429, 500, 502, 503, 504),
///   timeouts, connection errors
/// - Do NOT retry: any other status; the response goes back to the caller
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    total_retries: u32,
    /// Base delay of the exponential backoff
    backoff_factor: Duration,
    /// Cap for a single delay, including server-provided `Retry-After`
    max_backoff: Duration,
    /// Statuses that trigger a retry
    retry_statuses: Vec<StatusCode>,
}

impl RetryPolicy {
    /// Create a retry policy retrying the default status set
    pub fn new(total_retries: u32, backoff_factor: Duration, max_backoff: Duration) -> Self {
        Self {
            total_retries,
            backoff_factor,
            max_backoff,
            retry_statuses: default_statuses(),
        }
    }

    /// Replace the set of retryable statuses
    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<StatusCode>) -> Self {
        self.retry_statuses = statuses;
        self
    }

    /// Build a policy from validated configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        let statuses = config
            .retry_statuses
            .iter()
            .filter_map(|code| StatusCode::from_u16(*code).ok())
            .collect();

        Self::new(
            config.total_retries,
            Duration::try_from_secs_f64(config.backoff_factor_secs).unwrap_or(Duration::ZERO),
            Duration::try_from_secs_f64(config.max_backoff_secs).unwrap_or(Duration::ZERO),
        )
        .with_statuses(statuses)
    }

    pub const fn total_retries(&self) -> u32 {
        self.total_retries
    }

    /// Maximum number of requests issued for one call
    pub const fn max_attempts(&self) -> u32 {
        self.total_retries.saturating_add(1)
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before the given retry (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let multiplier = 2_u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_factor
            .saturating_mul(multiplier)
            .min(self.max_backoff)
    }

    /// Delay before the given retry, honoring a `Retry-After` header in
    /// seconds when the server sent one
    pub fn delay_for(&self, retry: u32, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or_else(
                || self.backoff(retry),
                |secs| Duration::from_secs(secs).min(self.max_backoff),
            )
    }
}

impl Default for RetryPolicy {
    /// 5 retries, 1s backoff factor, 120s cap
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(120))
    }
}

fn default_statuses() -> Vec<StatusCode> {
    vec![
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::BAD_GATEWAY,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::GATEWAY_TIMEOUT,
    ]
}
