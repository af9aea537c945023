//! Bounded retry for multi-step operations.
//!
//! Independent from the call scheduler: it wraps a whole operation (which
//! may itself issue several scheduled calls) and retries it when a
//! rate-limit or transient error surfaces above the scheduler layer.

use crate::error::{Result, SniperError};
use crate::scheduler::backoff_delay;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::warn;

/// Backoff schedule for `attempts` total attempts: `base`, `2*base`, ...
pub fn retry_schedule(base: Duration, attempts: usize) -> impl Iterator<Item = Duration> {
    let retries = attempts.saturating_sub(1) as u32;
    (0..retries).map(move |n| backoff_delay(base, n))
}

/// Run `operation` up to `attempts` times, retrying only retryable errors.
pub async fn with_backoff<T, F, Fut>(
    label: &'static str,
    base: Duration,
    attempts: usize,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    RetryIf::spawn(
        retry_schedule(base, attempts),
        operation,
        |err: &SniperError| {
            let retry = err.is_retryable();
            if retry {
                warn!(operation = label, "Retrying after error: {}", err);
            }
            retry
        },
    )
    .await
}
