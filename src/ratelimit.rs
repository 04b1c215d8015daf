use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use log::debug;
use nonzero_ext::nonzero;

pub struct RateLimiter {
    // None when throttling is disabled.
    min_interval: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Allows at most one request per `interval`, with no burst. A zero
    /// interval disables limiting.
    pub fn new(interval: Duration) -> Self {
        let min_interval = Quota::with_period(interval)
            .map(|quota| GovernorRateLimiter::direct(quota.allow_burst(nonzero!(1u32))));
        RateLimiter { min_interval }
    }

    pub fn is_limited(&self) -> bool {
        self.min_interval.is_some()
    }

    pub async fn wait_until_ready(&self) {
        if let Some(limiter) = &self.min_interval {
            debug!("waiting for rate limiter");
            limiter.until_ready().await;
        }
    }
}
