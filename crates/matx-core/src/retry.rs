//! Generic retry wrapper for single-page catalog calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{ApiError, ApiErrorKind};

/// Backoff strategy applied between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed {
        /// Delay between retries.
        delay: Duration,
    },
    /// Uses an exponential delay between retries.
    ///
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Default for Backoff {
    /// The catalog API rate-limits aggressively under bursty retries; a flat
    /// generous delay has proven safer than ramping ones.
    fn default() -> Self {
        Self::Fixed {
            delay: Duration::from_secs(15),
        }
    }
}

impl Backoff {
    /// Calculate the delay for a given retry attempt (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, factor, max, jitter } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped_seconds = seconds.min(max.as_secs_f64());

                let mut delay = Duration::from_secs_f64(capped_seconds);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms = delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// All knobs are explicit construction-time fields rather than process-wide
/// constants, so tests can run with millisecond delays.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget, including the first call.
    pub max_attempts: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// Whether `Unclassified` failures (unexpected statuses, connect-level
    /// errors) are retried alongside `ServerTransient` ones.
    pub retry_unclassified: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Backoff::default(),
            retry_unclassified: false,
        }
    }
}

impl RetryConfig {
    /// Fixed-delay retries with a custom budget.
    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    /// A single attempt, no sleeping.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_retry_unclassified(mut self, retry_unclassified: bool) -> Self {
        self.retry_unclassified = retry_unclassified;
        self
    }

    /// Whether a failed attempt is worth repeating.
    pub fn should_retry(&self, error: &ApiError) -> bool {
        match error.kind() {
            ApiErrorKind::ServerTransient => true,
            ApiErrorKind::Unclassified => self.retry_unclassified,
            ApiErrorKind::ClientRejected => false,
        }
    }

    /// Calculate the delay for a given retry attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Run `op` until it succeeds, the attempt budget is spent, or it fails with
/// a non-retryable error.
///
/// `op` is any zero-argument closure producing a fresh future per attempt, so
/// the same wrapper serves every endpoint. Retryable failures below the
/// budget sleep for the configured backoff before the next attempt; anything
/// else propagates immediately.
pub async fn retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= config.max_attempts || !config.should_retry(&error) {
                    return Err(error);
                }
                let delay = config.delay_for_attempt(attempt - 1);
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient catalog failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
