//! Retry with exponential backoff for transient transport failures.
//!
//! The default configuration makes a single attempt, so any failure aborts
//! the export. Raising `max_attempts` retries network errors, 429 and 5xx
//! responses. Parse errors are never retried.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first; 1 disables retries
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Set the number of attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Backoff delay before retry number `retry` (1-based), capped at `max_delay_ms`
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = self.initial_delay_ms as f64 * self.backoff_multiplier.powf(retry as f64 - 1.0);
        let capped = exp.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Network connectivity issues or timeouts
    Network,
    /// Too many requests (429)
    TooManyRequests,
    /// Service unavailable (503)
    ServiceUnavailable,
    /// Gateway timeout (504)
    GatewayTimeout,
    /// Any other server error (5xx)
    ServerError,
}

impl TransientError {
    /// Classify a SourceError; `None` means permanent
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::Status { status, .. } => {
                if *status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    Some(TransientError::TooManyRequests)
                } else if *status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                    Some(TransientError::ServiceUnavailable)
                } else if *status == reqwest::StatusCode::GATEWAY_TIMEOUT {
                    Some(TransientError::GatewayTimeout)
                } else if status.is_server_error() {
                    Some(TransientError::ServerError)
                } else {
                    None
                }
            }
            SourceError::Parse(_) | SourceError::MissingField { .. } => None,
        }
    }

    /// Minimum delay to wait before retrying this error
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::TooManyRequests => Duration::from_secs(5),
            TransientError::ServiceUnavailable => Duration::from_secs(2),
            TransientError::GatewayTimeout
            | TransientError::ServerError
            | TransientError::Network => Duration::ZERO,
        }
    }
}

/// Execute an async operation with retry logic
///
/// Returns the first success, the first permanent error, or the last
/// transient error once `max_attempts` is reached.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Request succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return Err(error);
                };

                if attempts >= max_attempts {
                    if max_attempts > 1 {
                        tracing::warn!("Request failed after {} attempts: {}", attempts, error);
                    }
                    return Err(error);
                }

                let delay = std::cmp::max(config.backoff(attempts), transient.recommended_delay())
                    .min(Duration::from_millis(config.max_delay_ms));

                tracing::warn!(
                    "Transient error on attempt {}/{}: {}, retrying in {:?}",
                    attempts,
                    max_attempts,
                    error,
                    delay
                );

                sleep(delay).await;
            }
        }
    }
}
