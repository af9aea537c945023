//! Outbound call scheduling.
//!
//! All remote work funnels through a single paced queue to stay under the
//! provider's throttling limits.

pub mod pacer;
pub mod queue;

pub use pacer::Pacer;
pub use queue::{backoff_delay, CallScheduler, SchedulerStats};
