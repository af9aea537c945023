//! Leaky-bucket pacing around governor.
//!
//! One permit per interval, no burst. Both the call scheduler and the
//! verification battery space their work through a `Pacer` instead of
//! sleeping ad hoc.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument};

pub struct Pacer {
    /// `None` when the interval is zero (pacing disabled)
    limiter: Option<DefaultDirectRateLimiter>,
    interval: Duration,
    acquired: AtomicU64,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(RateLimiter::direct);
        Self {
            limiter,
            interval,
            acquired: AtomicU64::new(0),
        }
    }

    /// Wait until the next slot opens and consume it.
    #[instrument(skip(self), level = "trace")]
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                debug!("Pacer saturated, waiting up to {:?}", self.interval);
                limiter.until_ready().await;
            }
        }
        self.acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Permits handed out so far.
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let pacer = Pacer::new(Duration::ZERO);
        let start = Instant::now();

        for _ in 0..100 {
            pacer.acquire().await;
        }

        assert_eq!(pacer.acquired(), 100);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_permits_are_spaced_by_interval() {
        let pacer = Pacer::new(Duration::from_millis(40));
        let start = Instant::now();

        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;

        // First permit is immediate, the next two wait one interval each
        assert!(start.elapsed() >= Duration::from_millis(70));
    }
}
