//! Trade submission seam.
//!
//! Building and signing the actual swap belongs to the wallet layer; the
//! controller only sees [`TradeSubmitter`]. [`PaperTrader`] fills at the
//! registry's quoted price without sending anything on-chain.

use crate::error::{Result, SniperError};
use crate::market::{min_out, PoolRegistry};
use crate::trading::types::TradeReceipt;
use async_trait::async_trait;
use chrono::Utc;
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait TradeSubmitter: Send + Sync {
    /// Spend `lamports` of the native asset on `mint`.
    async fn buy(&self, mint: &Pubkey, lamports: u64, slippage_bps: u16) -> Result<TradeReceipt>;

    /// Sell `token_amount` of `mint` back to the native asset.
    async fn sell(&self, mint: &Pubkey, token_amount: f64, slippage_bps: u16) -> Result<TradeReceipt>;
}

/// Dry-run submitter.
pub struct PaperTrader {
    registry: Arc<dyn PoolRegistry>,
    native_mint: Pubkey,
}

impl PaperTrader {
    pub fn new(registry: Arc<dyn PoolRegistry>, native_mint: Pubkey) -> Self {
        Self {
            registry,
            native_mint,
        }
    }

    fn signature(side: &str, mint: &Pubkey) -> String {
        format!("paper-{side}-{mint}-{}", Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl TradeSubmitter for PaperTrader {
    async fn buy(&self, mint: &Pubkey, lamports: u64, slippage_bps: u16) -> Result<TradeReceipt> {
        let pool = self.registry.find_pool(mint, &self.native_mint).await?;
        let amount_in = lamports_to_sol(lamports);
        let tokens = min_out(pool.quote(&self.native_mint, amount_in)?, slippage_bps);
        if tokens <= 0.0 {
            return Err(SniperError::SimulationFailure(format!("buy of {mint} fills nothing")));
        }

        info!(%mint, amount_in, tokens, "Paper buy filled");
        Ok(TradeReceipt {
            signature: Self::signature("buy", mint),
            input_amount: amount_in,
            output_amount: tokens,
        })
    }

    async fn sell(&self, mint: &Pubkey, token_amount: f64, slippage_bps: u16) -> Result<TradeReceipt> {
        let pool = self.registry.find_pool(mint, &self.native_mint).await?;
        let proceeds = min_out(pool.quote(mint, token_amount)?, slippage_bps);

        info!(%mint, token_amount, proceeds, "Paper sell filled");
        Ok(TradeReceipt {
            signature: Self::signature("sell", mint),
            input_amount: token_amount,
            output_amount: proceeds,
        })
    }
}
