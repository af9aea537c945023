//! Runs the check battery and turns it into a go/no-go verdict.
//!
//! One verification at a time, process-wide: the battery lock is a single
//! [`SingleFlight`] flag, not a per-token lock. Verdicts are cached by
//! mint so a repeat token never re-runs the battery.

use crate::error::Result;
use crate::guard::SingleFlight;
use crate::scheduler::Pacer;
use crate::verification::cache::VerdictCache;
use crate::verification::checks::TokenInspector;
use crate::verification::types::{CheckKind, CheckResultSet, VerificationOutcome};
use solana_sdk::pubkey::Pubkey;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub struct VerificationOrchestrator {
    inspector: TokenInspector,
    cache: Mutex<VerdictCache<Pubkey>>,
    battery_lock: SingleFlight,
    pacer: Pacer,
}

impl VerificationOrchestrator {
    pub fn new(inspector: TokenInspector, cache_capacity: usize, check_interval: Duration) -> Self {
        Self {
            inspector,
            cache: Mutex::new(VerdictCache::new(cache_capacity)),
            battery_lock: SingleFlight::new("verification_battery"),
            pacer: Pacer::new(check_interval),
        }
    }

    /// `true` only when every required check passed.
    pub async fn verify(&self, mint: &Pubkey) -> bool {
        self.verify_detailed(mint).await.verdict()
    }

    #[instrument(skip(self), fields(mint = %mint))]
    pub async fn verify_detailed(&self, mint: &Pubkey) -> VerificationOutcome {
        let Some(_permit) = self.battery_lock.try_acquire() else {
            info!("Verification already in progress, skipping");
            return VerificationOutcome::Skipped;
        };

        if let Some(verdict) = self.cached(mint) {
            info!(verdict, "Verdict served from cache");
            return VerificationOutcome::Cached(verdict);
        }

        let started = Instant::now();
        match self.run_battery(mint).await {
            Ok(results) => {
                let verdict = results.verdict();
                if let Some(evicted) = self.store(*mint, verdict) {
                    debug!(%evicted, "Evicted oldest verdict");
                }
                info!(
                    verdict,
                    unmet = ?results.unmet_conditions(),
                    centralized = ?results.ownership_centralized,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Verification complete"
                );
                VerificationOutcome::Completed { results, verdict }
            }
            Err(err) => {
                warn!("Verification aborted: {}", err);
                VerificationOutcome::Aborted(err)
            }
        }
    }

    async fn run_battery(&self, mint: &Pubkey) -> Result<CheckResultSet> {
        let mut results = CheckResultSet::default();

        for kind in CheckKind::ALL {
            self.pacer.acquire().await;

            let outcome = match self.inspector.run(kind, mint).await {
                Ok(passed) => Some(passed),
                Err(err) if kind.fails_closed() => {
                    warn!(check = kind.name(), "Check failed closed: {}", err);
                    None
                }
                Err(err) => return Err(err),
            };

            info!(check = kind.name(), outcome = ?outcome, "Check finished");
            results.record(kind, outcome);
        }

        Ok(results)
    }

    pub fn cached(&self, mint: &Pubkey) -> Option<bool> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(mint)
    }

    fn store(&self, mint: Pubkey, verdict: bool) -> Option<Pubkey> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .put(mint, verdict)
    }

    pub fn cache_len(&self) -> usize {
        self.cache
            .lock()
            .map(|cache| cache.len())
            .unwrap_or_default()
    }

    /// The lock gating entry into the battery.
    pub fn battery_lock(&self) -> &SingleFlight {
        &self.battery_lock
    }
}
