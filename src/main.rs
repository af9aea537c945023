//! Entry point for the pool sniper service.
//!
//! Usage: `pool-sniper [config.toml]`. Without an argument the path is read
//! from `SNIPER_CONFIG`, falling back to `sniper.toml`.

use anyhow::{Context, Result};
use pool_sniper::chain::SolanaRpc;
use pool_sniper::discovery::LogSubscriber;
use pool_sniper::market::{CachedPriceOracle, HttpPriceOracle, RaydiumPoolRegistry};
use pool_sniper::trading::PaperTrader;
use pool_sniper::{Coordinator, Gateways, SniperConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "sniper.toml";
const PRICE_CACHE_TTL: Duration = Duration::from_secs(30);
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_CHANNEL_CAPACITY: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SNIPER_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = SniperConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;
    let ids = config.validate().context("validating configuration")?;

    info!(wallet = %ids.wallet, amm = %ids.amm_program, "Starting pool sniper");

    let http_client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")?;
    let registry = Arc::new(RaydiumPoolRegistry::new(
        http_client.clone(),
        config.pool_api_url.clone(),
    ));
    let price_oracle = Arc::new(CachedPriceOracle::new(
        Arc::new(HttpPriceOracle::new(http_client, config.price_api_url.clone())),
        PRICE_CACHE_TTL,
    ));
    let gateways = Gateways {
        rpc: Arc::new(SolanaRpc::new(config.rpc_url.clone(), HTTP_TIMEOUT)),
        registry: registry.clone(),
        price_oracle,
        submitter: Arc::new(PaperTrader::new(registry, ids.native_mint)),
    };

    let coordinator = Coordinator::new(&config, ids, gateways);
    let subscriber = LogSubscriber::new(
        config.ws_url.clone(),
        ids.amm_program,
        config.reconnect_delay(),
        config.reconnect_attempts,
    );

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let coordinator_handle = tokio::spawn(coordinator.run(event_rx, shutdown_rx.clone()));
    let mut subscriber_handle = tokio::spawn(async move { subscriber.run(event_tx, shutdown_rx).await });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for interrupt")?;
            info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
            if let Ok(Err(err)) = (&mut subscriber_handle).await {
                error!("Subscriber stopped with error during shutdown: {}", err);
            }
            let _ = coordinator_handle.await;
            info!("Shutdown complete");
            Ok(())
        }
        finished = &mut subscriber_handle => {
            let _ = shutdown_tx.send(true);
            let _ = coordinator_handle.await;
            match finished.context("subscriber task panicked")? {
                Ok(()) => Ok(()),
                Err(err) => {
                    error!("Event subscription failed: {}", err);
                    Err(err).context("event subscription")
                }
            }
        }
    }
}
