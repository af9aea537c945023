//! Event deduplication and process-wide single-flight locks.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Remembers every transaction id that has been admitted.
#[derive(Default)]
pub struct AdmissionGuard {
    seen: Mutex<HashSet<String>>,
}

impl AdmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time `transaction_id` is offered, `false` afterwards.
    pub fn admit(&self, transaction_id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if seen.contains(transaction_id) {
            debug!(tx = transaction_id, "Duplicate discovery event ignored");
            return false;
        }
        seen.insert(transaction_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Idle/busy flag. Holding a [`FlightPermit`] means busy; dropping it, on
/// any exit path, returns the flag to idle.
#[derive(Clone)]
pub struct SingleFlight {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Take the flag, or `None` if someone else holds it.
    pub fn try_acquire(&self) -> Option<FlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit {
                name: self.name,
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[must_use = "the lock is released as soon as the permit is dropped"]
pub struct FlightPermit {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        debug!(lock = self.name, "Released");
    }
}
