//! Request pacing with a token bucket.
//!
//! The bucket holds up to `requests_per_interval` tokens and refills
//! continuously at `requests_per_interval / interval`. With the default
//! (1 per second) consecutive requests are at least one second apart.
//! A rate-limit rejection from the endpoint can `throttle` the bucket,
//! blocking further requests until the server's deadline passes.

use crate::config::PacingConfig;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Longest hold a single [`RateLimiter::throttle`] call can impose.
pub const MAX_THROTTLE: Duration = Duration::from_secs(300);

/// Token-bucket rate limiter for sequential model calls.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    tokens: f64,
    /// Tokens added per second
    refill_rate: f64,
    last_refill: Instant,
    blocked_until: Option<Instant>,
}

impl RateLimiter {
    /// Create a full bucket allowing `requests` per `interval`.
    ///
    /// Zero values are clamped to one request per millisecond-long interval.
    pub fn new(requests: u32, interval: Duration) -> Self {
        let requests = requests.max(1) as f64;
        let interval = interval.max(Duration::from_millis(1));
        Self {
            capacity: requests,
            tokens: requests,
            refill_rate: requests / interval.as_secs_f64(),
            last_refill: Instant::now(),
            blocked_until: None,
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(
            config.requests_per_interval,
            Duration::from_millis(config.interval_ms),
        )
    }

    /// Wait until a token is available and take it.
    ///
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let start = Instant::now();
        loop {
            let now = Instant::now();

            if let Some(until) = self.blocked_until {
                if now < until {
                    tracing::debug!("Throttled, waiting {:?}", until - now);
                    sleep_until(until).await;
                    continue;
                }
                // One request may go out as soon as the throttle lifts
                self.blocked_until = None;
                self.tokens = self.tokens.max(1.0);
                self.last_refill = now;
            }

            self.refill(now);
            if self.tokens >= 1.0 {
                self.tokens -= 1.0;
                return start.elapsed();
            }

            let deficit = 1.0 - self.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_rate);
            sleep_until(now + wait).await;
        }
    }

    /// Empty the bucket and hold all requests for `duration`, at most
    /// [`MAX_THROTTLE`].
    ///
    /// A later deadline wins over an earlier one.
    pub fn throttle(&mut self, duration: Duration) {
        let until = Instant::now() + duration.min(MAX_THROTTLE);
        self.tokens = 0.0;
        self.blocked_until = Some(match self.blocked_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}
