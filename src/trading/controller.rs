//! Executes approved trades and watches them for the sell trigger.

use crate::chain::ChainRpc;
use crate::error::{Result, SniperError};
use crate::market::{PoolRegistry, PriceOracle};
use crate::scheduler::CallScheduler;
use crate::trading::submitter::TradeSubmitter;
use crate::trading::types::{should_sell, TradePosition, TradeReceipt};
use chrono::Utc;
use solana_sdk::native_token::sol_to_lamports;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Copy)]
pub struct TradeSettings {
    pub wallet: Pubkey,
    pub native_mint: Pubkey,
    pub buy_amount_usd: f64,
    pub take_profit_factor: f64,
    pub monitor_interval: Duration,
    pub slippage_bps: u16,
}

pub struct TradeController {
    rpc: Arc<dyn ChainRpc>,
    price_oracle: Arc<dyn PriceOracle>,
    registry: Arc<dyn PoolRegistry>,
    submitter: Arc<dyn TradeSubmitter>,
    scheduler: CallScheduler,
    settings: TradeSettings,
}

impl TradeController {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        price_oracle: Arc<dyn PriceOracle>,
        registry: Arc<dyn PoolRegistry>,
        submitter: Arc<dyn TradeSubmitter>,
        scheduler: CallScheduler,
        settings: TradeSettings,
    ) -> Self {
        Self {
            rpc,
            price_oracle,
            registry,
            submitter,
            scheduler,
            settings,
        }
    }

    /// Buy `mint` and hand the position to a background monitor.
    pub async fn execute(self: &Arc<Self>, mint: &Pubkey) -> Result<JoinHandle<()>> {
        let position = self.buy(mint).await?;

        let controller = self.clone();
        Ok(tokio::spawn(async move {
            let mint = position.token_address;
            match controller.monitor(position).await {
                Ok(receipt) => info!(%mint, signature = %receipt.signature, proceeds = receipt.output_amount, "Position closed"),
                Err(err) => error!(%mint, "Profit monitor stopped: {}", err),
            }
        }))
    }

    /// Convert the USD notional to native units and submit the buy.
    #[instrument(skip(self), fields(mint = %mint))]
    pub async fn buy(&self, mint: &Pubkey) -> Result<TradePosition> {
        let oracle = self.price_oracle.clone();
        let native_price = self
            .scheduler
            .submit("native_usd_price", move || {
                let oracle = oracle.clone();
                async move { oracle.native_usd_price().await }
            })
            .await?;
        let lamports = sol_to_lamports(self.settings.buy_amount_usd / native_price);

        let rpc = self.rpc.clone();
        let wallet = self.settings.wallet;
        let available = self
            .scheduler
            .submit("get_balance", move || {
                let rpc = rpc.clone();
                async move { rpc.get_balance(&wallet).await }
            })
            .await?;
        if available < lamports {
            return Err(SniperError::InsufficientBalance {
                needed: lamports,
                available,
            });
        }

        let submitter = self.submitter.clone();
        let target = *mint;
        let slippage = self.settings.slippage_bps;
        let receipt = self
            .scheduler
            .submit("submit_buy", move || {
                let submitter = submitter.clone();
                async move { submitter.buy(&target, lamports, slippage).await }
            })
            .await?;

        if receipt.output_amount <= 0.0 {
            return Err(SniperError::SimulationFailure("buy returned no tokens".into()));
        }
        let buy_price = receipt.input_amount / receipt.output_amount;
        let position = TradePosition {
            token_address: *mint,
            buy_price,
            target_price: buy_price * self.settings.take_profit_factor,
            token_amount: receipt.output_amount,
            buy_signature: receipt.signature,
            opened_at: Utc::now(),
        };

        info!(
            lamports,
            usd = self.settings.buy_amount_usd,
            buy_price = position.buy_price,
            target_price = position.target_price,
            "Bought token"
        );
        Ok(position)
    }

    /// Poll until the sell trigger fires, then sell everything held.
    pub async fn monitor(&self, position: TradePosition) -> Result<TradeReceipt> {
        info!(mint = %position.token_address, "Monitoring position");
        loop {
            tokio::time::sleep(self.settings.monitor_interval).await;
            if let Some(receipt) = self.poll(&position).await? {
                return Ok(receipt);
            }
        }
    }

    /// One monitoring step: sells and returns the receipt if triggered.
    pub async fn poll(&self, position: &TradePosition) -> Result<Option<TradeReceipt>> {
        let current_price = self.current_price(&position.token_address).await?;
        debug!(current_price, target = position.target_price, "Polled price");

        if !should_sell(current_price, position.buy_price, self.settings.take_profit_factor) {
            return Ok(None);
        }

        info!(current_price, buy_price = position.buy_price, "Sell trigger reached");
        let submitter = self.submitter.clone();
        let mint = position.token_address;
        let amount = position.token_amount;
        let slippage = self.settings.slippage_bps;
        let receipt = self
            .scheduler
            .submit("submit_sell", move || {
                let submitter = submitter.clone();
                async move { submitter.sell(&mint, amount, slippage).await }
            })
            .await?;
        Ok(Some(receipt))
    }

    async fn current_price(&self, mint: &Pubkey) -> Result<f64> {
        let registry = self.registry.clone();
        let mint = *mint;
        let native_mint = self.settings.native_mint;
        let pool = self
            .scheduler
            .submit("find_pool", move || {
                let registry = registry.clone();
                async move { registry.find_pool(&mint, &native_mint).await }
            })
            .await?;
        pool.price_of(&mint)
            .ok_or_else(|| SniperError::MalformedData(format!("no price for {mint}")))
    }
}
