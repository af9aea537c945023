//! Single-worker FIFO call scheduler.
//!
//! Every outbound remote call goes through here. One worker drains the
//! queue, pacing attempts through a [`Pacer`]. Calls rejected with a
//! provider rate-limit marker are put back at the head of the queue after
//! an exponential backoff, so retries run before newer work.

use crate::error::{Result, SniperError};
use crate::scheduler::pacer::Pacer;
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, warn};

type Reply = Result<Box<dyn Any + Send>>;
type Operation = Box<dyn Fn() -> BoxFuture<'static, Reply> + Send + Sync>;

/// A call waiting for (another) attempt.
struct PendingCall {
    label: &'static str,
    operation: Operation,
    reply: oneshot::Sender<Reply>,
    retries_so_far: u32,
    max_retries: u32,
}

struct QueueState {
    queue: VecDeque<PendingCall>,
    worker_active: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    pacer: Pacer,
    max_retries: u32,
    retry_base_delay: Duration,
    stats: Counters,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time scheduler counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub attempts: u64,
    pub retries: u64,
    pub failed: u64,
}

/// Delay before retry number `retries_so_far + 1`: `base * 2^retries_so_far`.
pub fn backoff_delay(base: Duration, retries_so_far: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retries_so_far))
}

/// Cloneable handle onto the shared queue.
#[derive(Clone)]
pub struct CallScheduler {
    inner: Arc<Inner>,
}

impl CallScheduler {
    pub fn new(pacing_interval: Duration, max_retries: u32, retry_base_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    worker_active: false,
                }),
                pacer: Pacer::new(pacing_interval),
                max_retries,
                retry_base_delay,
                stats: Counters::default(),
            }),
        }
    }

    pub fn from_config(config: &crate::config::SniperConfig) -> Self {
        Self::new(
            config.pacing_interval(),
            config.max_retries,
            config.retry_base_delay(),
        )
    }

    /// Queue `operation` and wait until it succeeds or is abandoned.
    ///
    /// `operation` is invoked once per attempt, so it must be able to build
    /// a fresh future every time.
    pub async fn submit<T, F, Fut>(&self, label: &'static str, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let operation: Operation = Box::new(move || {
            let attempt = operation();
            async move { attempt.await.map(|value| Box::new(value) as Box<dyn Any + Send>) }.boxed()
        });

        self.enqueue(PendingCall {
            label,
            operation,
            reply,
            retries_so_far: 0,
            max_retries: self.inner.max_retries,
        })
        .await;

        let value = receiver.await.map_err(|_| SniperError::SchedulerClosed)??;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| SniperError::MalformedData(format!("{label}: unexpected reply type")))
    }

    /// Calls waiting in the queue (excluding one currently being attempted).
    pub async fn queued(&self) -> usize {
        self.inner.state.lock().await.queue.len()
    }

    pub async fn is_idle(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.queue.is_empty() && !state.worker_active
    }

    pub fn stats(&self) -> SchedulerStats {
        let stats = &self.inner.stats;
        SchedulerStats {
            submitted: stats.submitted.load(Ordering::Relaxed),
            attempts: stats.attempts.load(Ordering::Relaxed),
            retries: stats.retries.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
        }
    }

    async fn enqueue(&self, call: PendingCall) {
        self.inner.stats.submitted.fetch_add(1, Ordering::Relaxed);
        let start_worker = {
            let mut state = self.inner.state.lock().await;
            state.queue.push_back(call);
            !std::mem::replace(&mut state.worker_active, true)
        };

        if start_worker {
            debug!("Call scheduler worker starting");
            let inner = self.inner.clone();
            tokio::spawn(inner.drain());
        }
    }
}

impl Inner {
    /// Worker loop; exits (and marks itself idle) once the queue is empty.
    async fn drain(self: Arc<Self>) {
        loop {
            let call = {
                let mut state = self.state.lock().await;
                match state.queue.pop_front() {
                    Some(call) => call,
                    None => {
                        state.worker_active = false;
                        debug!("Call scheduler queue empty, worker idle");
                        return;
                    }
                }
            };

            self.pacer.acquire().await;
            self.attempt(call).await;
        }
    }

    async fn attempt(&self, mut call: PendingCall) {
        self.stats.attempts.fetch_add(1, Ordering::Relaxed);

        let operation = &call.operation;
        let outcome = match AssertUnwindSafe(async move { operation().await })
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(call = call.label, "Scheduled call panicked");
                let _ = call.reply.send(Err(SniperError::CallPanicked(call.label)));
                return;
            }
        };

        match outcome {
            Ok(value) => {
                let _ = call.reply.send(Ok(value));
            }
            Err(err) if err.is_rate_limited() && call.retries_so_far < call.max_retries => {
                let delay = backoff_delay(self.retry_base_delay, call.retries_so_far);
                warn!(
                    call = call.label,
                    retry = call.retries_so_far + 1,
                    max_retries = call.max_retries,
                    "Rate limited, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                call.retries_so_far += 1;
                self.stats.retries.fetch_add(1, Ordering::Relaxed);
                self.state.lock().await.queue.push_front(call);
            }
            Err(err) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                debug!(call = call.label, retries = call.retries_so_far, "Call abandoned: {}", err);
                let _ = call.reply.send(Err(err));
            }
        }
    }
}
