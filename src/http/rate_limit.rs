//! Sliding-window rate limiting
//!
//! Dayforce caps the number of requests a client may start within a period.
//! The limiter keeps the start times of the most recent requests and, once
//! the window is full, sleeps until the oldest start has aged out of the
//! period before letting the next request begin.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Request cap: at most `max_requests` starts per `period_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Maximum number of requests started within one period
    pub max_requests: usize,
    /// Length of the sliding period in seconds
    pub period_seconds: u64,
}

impl RateLimit {
    /// Create a rate limit, rejecting a zero request budget
    pub fn new(max_requests: usize, period_seconds: u64) -> Result<Self> {
        let limit = Self {
            max_requests,
            period_seconds,
        };
        limit.validate()?;
        Ok(limit)
    }

    /// Check the limit can ever admit a request
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(Error::invalid_value(
                "rate_limit.max_requests",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// The sliding period as a duration
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }
}

/// Sliding-window limiter owned by a single request sequence
///
/// Not shared: every paginated sequence that wants throttling carries its
/// own window, so independent sequences never contend.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: RateLimit,
    window: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter with an empty window
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            window: VecDeque::with_capacity(limit.max_requests.max(1)),
        }
    }

    /// The limit this limiter enforces
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Number of request starts currently recorded
    pub fn recorded(&self) -> usize {
        self.window.len()
    }

    /// Wait until a new request may start, then record its start time.
    ///
    /// Must be called immediately before every request. When the window is
    /// full this sleeps for `period - (now - oldest)` and evicts the oldest
    /// start. A request that later fails still counts.
    pub async fn throttle(&mut self) {
        let capacity = self.limit.max_requests.max(1);

        if self.window.len() >= capacity {
            if let Some(oldest) = self.window.front().copied() {
                let elapsed = Instant::now().saturating_duration_since(oldest);
                if let Some(sleep_time) = self.limit.period().checked_sub(elapsed) {
                    if !sleep_time.is_zero() {
                        warn!(
                            "Rate limit of {} requests per {}s reached, waiting {:?}",
                            self.limit.max_requests, self.limit.period_seconds, sleep_time
                        );
                        tokio::time::sleep(sleep_time).await;
                    }
                }
            }
            self.window.pop_front();
        }

        self.window.push_back(Instant::now());
    }
}

/// Throttle through an optional limiter; `None` never waits
pub async fn throttle(limiter: Option<&mut RateLimiter>) {
    if let Some(limiter) = limiter {
        limiter.throttle().await;
    }
}
