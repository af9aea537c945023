//! Wires discovery, resolution, verification and trading together.
//!
//! Events arrive on a channel from the log subscriber. At most one event is
//! carried through the pipeline at a time; events that arrive while the
//! pipeline is busy are dropped, not queued.

use crate::chain::ChainRpc;
use crate::config::{NetworkIds, SniperConfig};
use crate::error::SniperError;
use crate::guard::{AdmissionGuard, SingleFlight};
use crate::market::{PoolRegistry, PriceOracle};
use crate::resolver::EventResolver;
use crate::scheduler::CallScheduler;
use crate::trading::{TradeController, TradeSettings, TradeSubmitter};
use crate::types::{DiscoveryEvent, Resolution};
use crate::verification::{CheckSettings, TokenInspector, VerificationOrchestrator, VerificationOutcome};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Remote dependencies shared by every stage.
#[derive(Clone)]
pub struct Gateways {
    pub rpc: Arc<dyn ChainRpc>,
    pub registry: Arc<dyn PoolRegistry>,
    pub price_oracle: Arc<dyn PriceOracle>,
    pub submitter: Arc<dyn TradeSubmitter>,
}

/// How far a single event got.
#[derive(Debug)]
pub enum PipelineOutcome {
    ResolveFailed(SniperError),
    NoValidPair,
    NativePairSkipped,
    Rejected { token: Pubkey, outcome: VerificationOutcome },
    TradeFailed { token: Pubkey, error: SniperError },
    Trading { token: Pubkey },
}

pub struct Coordinator {
    admission: AdmissionGuard,
    pipeline_lock: SingleFlight,
    scheduler: CallScheduler,
    resolver: EventResolver,
    orchestrator: VerificationOrchestrator,
    trader: Arc<TradeController>,
    native_mint: Pubkey,
}

impl Coordinator {
    /// Build every stage from configuration, sharing one call scheduler.
    pub fn new(config: &SniperConfig, ids: NetworkIds, gateways: Gateways) -> Arc<Self> {
        let scheduler = CallScheduler::from_config(config);

        let resolver = EventResolver::new(
            gateways.rpc.clone(),
            scheduler.clone(),
            ids.amm_program,
            ids.native_mint,
        )
        .with_retry(config.retry_base_delay(), config.wrapper_attempts);

        let inspector = TokenInspector::new(
            gateways.rpc.clone(),
            gateways.registry.clone(),
            scheduler.clone(),
            CheckSettings {
                wallet: ids.wallet,
                amm_program: ids.amm_program,
                native_mint: ids.native_mint,
                probe_lamports: config.probe_lamports,
                honeypot_threshold: config.honeypot_threshold,
                max_top_holder_share: config.max_top_holder_share,
            },
        );
        let orchestrator = VerificationOrchestrator::new(
            inspector,
            config.verdict_cache_capacity,
            config.check_interval(),
        );

        let trader = Arc::new(TradeController::new(
            gateways.rpc,
            gateways.price_oracle,
            gateways.registry,
            gateways.submitter,
            scheduler.clone(),
            TradeSettings {
                wallet: ids.wallet,
                native_mint: ids.native_mint,
                buy_amount_usd: config.buy_amount_usd,
                take_profit_factor: config.take_profit_factor,
                monitor_interval: config.monitor_interval(),
                slippage_bps: config.slippage_bps,
            },
        ));

        Arc::new(Self {
            admission: AdmissionGuard::new(),
            pipeline_lock: SingleFlight::new("pipeline"),
            scheduler,
            resolver,
            orchestrator,
            trader,
            native_mint: ids.native_mint,
        })
    }

    /// Consume discovery events until the channel closes or shutdown is signalled.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<DiscoveryEvent>, mut shutdown: watch::Receiver<bool>) {
        info!("Coordinator started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                next = events.recv() => match next {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => break,
                },
            }
        }
        info!("Coordinator stopped");
    }

    /// Start the pipeline for `event` in the background, or drop it.
    ///
    /// Returns `None` when the pipeline is busy or the event was seen before.
    pub fn dispatch(self: &Arc<Self>, event: DiscoveryEvent) -> Option<JoinHandle<PipelineOutcome>> {
        let Some(permit) = self.pipeline_lock.try_acquire() else {
            info!(tx = %event.transaction_id, "Pipeline busy, event dropped");
            return None;
        };
        if !self.admission.admit(&event.transaction_id) {
            return None;
        }

        let coordinator = self.clone();
        Some(tokio::spawn(async move {
            let _permit = permit;
            coordinator.process(&event).await
        }))
    }

    /// Carry one admitted event from resolution to trade.
    #[instrument(skip(self, event), fields(tx = %event.transaction_id))]
    pub async fn process(&self, event: &DiscoveryEvent) -> PipelineOutcome {
        let pair = match self.resolver.resolve(&event.transaction_id).await {
            Ok(Resolution::Pair(pair)) => pair,
            Ok(Resolution::NoValidPair) => return PipelineOutcome::NoValidPair,
            Ok(Resolution::NativePairSkipped) => return PipelineOutcome::NativePairSkipped,
            Err(err) => {
                warn!("Could not resolve event: {}", err);
                return PipelineOutcome::ResolveFailed(err);
            }
        };

        let token = pair.candidate_token(&self.native_mint);
        let outcome = self.orchestrator.verify_detailed(&token).await;
        if !outcome.verdict() {
            info!(%token, "Token rejected");
            return PipelineOutcome::Rejected { token, outcome };
        }

        info!(%token, "Token approved, trading");
        match self.trader.execute(&token).await {
            Ok(_monitor) => PipelineOutcome::Trading { token },
            Err(err) => {
                error!(%token, "Trade failed: {}", err);
                PipelineOutcome::TradeFailed { token, error: err }
            }
        }
    }

    pub fn admitted(&self) -> usize {
        self.admission.len()
    }

    pub fn is_busy(&self) -> bool {
        self.pipeline_lock.is_busy()
    }

    pub fn scheduler(&self) -> &CallScheduler {
        &self.scheduler
    }

    pub fn orchestrator(&self) -> &VerificationOrchestrator {
        &self.orchestrator
    }
}
