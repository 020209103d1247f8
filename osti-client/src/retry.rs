//! Retry policy for transient request failures
//!
//! Requests that fail with a transport error (connection refused, timeout)
//! or a throttling/server status are retried with exponential backoff and
//! jitter. Everything else is returned to the caller on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Classifies errors into transient (worth retrying) and permanent ones
pub trait RetryableError {
    /// Whether the failed operation may succeed if attempted again
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in log output
    fn retry_reason(&self) -> &str;
}

/// Backoff configuration for retried requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Randomize delays to avoid synchronized retries
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a retry configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that never retries
    ///
    /// # Example
    ///
    /// ```
    /// use osti_client::RetryConfig;
    ///
    /// let config = RetryConfig::no_retry();
    /// assert_eq!(config.max_retries, 0);
    /// ```
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delays between attempts, doubling from `initial_delay`
    pub(crate) fn delays(&self) -> Vec<Duration> {
        // ExponentialBackoff yields factor * 2^n milliseconds, n starting at 1
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        let use_jitter = self.use_jitter;

        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(move |delay| if use_jitter { jitter(delay) } else { delay })
            .take(self.max_retries)
            .collect()
    }
}

/// Run `operation`, retrying retryable failures according to `config`
///
/// # Arguments
///
/// * `operation` - Closure producing a fresh future for every attempt
/// * `config` - Backoff policy
/// * `operation_name` - Label used in log output
pub async fn with_retry<F, Fut, T, E>(
    operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let max_retries = config.max_retries;
    let mut attempt = 0usize;

    RetryIf::spawn(config.delays(), operation, |err: &E| {
        attempt += 1;
        if !err.is_retryable() {
            debug!(
                operation = operation_name,
                reason = err.retry_reason(),
                "Not retrying"
            );
            return false;
        }
        if attempt <= max_retries {
            warn!(
                operation = operation_name,
                attempt,
                max_retries,
                reason = err.retry_reason(),
                error = %err,
                "Retrying after transient failure"
            );
        }
        true
    })
    .await
}
