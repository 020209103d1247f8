use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Rate limiter using a token bucket, shared by clones of a client
///
/// OSTI.gov publishes no hard limit; the default of 3 requests per second
/// keeps full-result pagination polite.
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified rate
    ///
    /// # Arguments
    ///
    /// * `rate` - Maximum requests per second. A rate that is not a finite
    ///   positive number falls back to the OSTI default.
    ///
    /// # Example
    ///
    /// ```
    /// use osti_client::rate_limit::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(3.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = if is_valid_rate(rate) {
            rate
        } else {
            warn!(rate, "Invalid rate limit, using the default");
            crate::config::DEFAULT_RATE_LIMIT
        };
        let capacity = rate.max(1.0);
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Rate limiter with the default OSTI request rate (3 requests/second)
    pub fn osti_default() -> Self {
        Self::new(crate::config::DEFAULT_RATE_LIMIT)
    }

    /// Acquire a token, waiting if necessary to respect the rate limit
    ///
    /// # Example
    ///
    /// ```no_run
    /// use osti_client::rate_limit::RateLimiter;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let limiter = RateLimiter::osti_default();
    ///
    ///     limiter.acquire().await.unwrap();
    ///     // Make API call here
    /// }
    /// ```
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> crate::Result<()> {
        let wait_time = {
            let mut bucket = self.bucket.lock().await;
            bucket.refill();

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                debug!(remaining_tokens = %bucket.tokens, "Token acquired immediately");
                None
            } else {
                let missing = 1.0 - bucket.tokens;
                let wait_duration = Duration::from_secs_f64(missing / bucket.refill_rate);
                debug!(
                    wait_duration_ms = wait_duration.as_millis(),
                    "Need to wait for token"
                );
                Some(wait_duration)
            }
        };

        if let Some(duration) = wait_time {
            sleep(duration).await;

            let mut bucket = self.bucket.lock().await;
            bucket.refill();

            // Float rounding can leave the bucket a hair below one token
            if bucket.tokens >= 1.0 - f64::EPSILON * 16.0 {
                bucket.tokens = (bucket.tokens - 1.0).max(0.0);
                debug!(remaining_tokens = %bucket.tokens, "Token acquired after waiting");
            } else {
                warn!("Failed to acquire token after waiting");
                return Err(crate::error::OstiError::RateLimitExceeded);
            }
        }

        Ok(())
    }

    /// Check if a token is available without consuming it
    pub async fn check_available(&self) -> bool {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens >= 1.0
    }

    /// Get current token count (for testing and monitoring)
    pub async fn token_count(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens
    }

    /// Get the configured rate limit (requests per second)
    pub async fn rate(&self) -> f64 {
        let bucket = self.bucket.lock().await;
        bucket.refill_rate
    }
}

/// Whether `rate` can drive a token bucket (finite and above zero)
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity);
        self.last_refill = now;
    }
}
