//! Retry policy for object-store reads.
//!
//! Every request this crate issues is a `GET` or `HEAD`, so a request can be
//! replayed freely. Two kinds of failure are retried:
//!
//! - transport errors (connection refused, reset, timeout);
//! - the statuses S3-compatible stores answer when throttling or briefly
//!   unavailable: `500 InternalError`, `502`, `503 SlowDown`, `504`.
//!
//! Any other status goes straight back to the caller. When the retries run
//! out the last response (or transport error) is returned as-is, so status
//! mapping stays in one place.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// Bounded exponential backoff for idempotent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first request.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Statuses worth replaying a read for.
    pub fn is_retryable(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    /// Send the read built by `send`, replaying it on transport errors and
    /// throttling statuses.
    pub(crate) async fn send<F, Fut>(
        &self,
        method: &'static str,
        key: &str,
        send: F,
    ) -> Result<Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = send().await;
            if attempt >= self.max_retries {
                return outcome;
            }
            let reason = match &outcome {
                Ok(resp) if Self::is_retryable(resp.status()) => resp.status().to_string(),
                Ok(_) => return outcome,
                Err(err) => err.to_string(),
            };
            let delay = self.delay(attempt);
            attempt += 1;
            tracing::warn!(
                method,
                key,
                attempt,
                max_retries = self.max_retries,
                ?delay,
                reason = %reason,
                "object store read failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
