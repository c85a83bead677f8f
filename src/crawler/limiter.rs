//! Request rate limiting
//!
//! A token bucket sized to the store's request quota. The bucket starts full and
//! refills continuously, so short bursts go through immediately while the long-run
//! rate never exceeds `capacity` requests per `window`.

use std::time::{Duration, Instant};

/// Token bucket limiter shared by every request of a crawl
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Maximum number of stored tokens
    capacity: f64,

    /// Tokens added per second
    refill_rate: f64,

    /// Currently available tokens
    tokens: f64,

    /// Last time tokens were added
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a full bucket allowing `capacity` requests per `window`
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let window = window.as_secs_f64().max(f64::EPSILON);

        Self {
            capacity,
            refill_rate: capacity / window,
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes a token if one is available at `now`
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until a token is available, or None if one is available at `now`
    pub fn time_until_available(&mut self, now: Instant) -> Option<Duration> {
        self.refill(now);
        if self.tokens >= 1.0 {
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate))
        }
    }

    /// Waits until a token is available and takes it
    pub async fn acquire(&mut self) {
        loop {
            let now = Instant::now();
            if self.try_acquire(now) {
                return;
            }

            if let Some(wait) = self.time_until_available(now) {
                tracing::debug!("Request quota exhausted, waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}
