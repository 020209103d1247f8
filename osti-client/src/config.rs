//! Client configuration
//!
//! [`ClientConfig`] collects everything an [`OstiClient`](crate::OstiClient)
//! needs besides the query itself: the endpoint, request timeout, user agent,
//! rate limit and retry policy.

use std::time::Duration;

use crate::error::{OstiError, Result};
use crate::rate_limit::{is_valid_rate, RateLimiter};
use crate::retry::RetryConfig;

/// OSTI.gov records search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.osti.gov/api/v1/records";

/// Requests per second when no rate limit is configured
pub const DEFAULT_RATE_LIMIT: f64 = 3.0;

/// Request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`OstiClient`](crate::OstiClient)
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use osti_client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_rate_limit(1.0)
///     .with_user_agent("my-harvester/1.0");
///
/// assert_eq!(config.effective_rate_limit(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint override; [`DEFAULT_ENDPOINT`] when unset
    pub base_url: Option<String>,
    /// Timeout applied to every request
    pub timeout: Duration,
    /// User-Agent override
    pub user_agent: Option<String>,
    /// Requests per second override
    pub rate_limit: Option<f64>,
    /// Backoff policy for transient failures
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            rate_limit: None,
            retry_config: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another records endpoint (e.g. a mock server)
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Maximum requests per second
    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("osti-client/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }

    /// Check the settings that cannot be used as given
    ///
    /// # Errors
    ///
    /// * `OstiError::InvalidParameter` - the rate limit is not a finite
    ///   number above zero
    pub fn validate(&self) -> Result<()> {
        let rate = self.effective_rate_limit();
        if !is_valid_rate(rate) {
            return Err(OstiError::InvalidParameter(format!(
                "rate limit must be a positive number of requests per second, got {}",
                rate
            )));
        }
        Ok(())
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}
