//! Liquidity-pool registry lookups.

use crate::error::{Result, SniperError};
use crate::market::quote::{quote_exact_in, DEFAULT_FEE_BPS};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use tracing::{debug, instrument};

/// A pool pairing two mints, with reserves in UI units.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolInfo {
    pub id: Pubkey,
    pub program_id: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub reserve_a: f64,
    pub reserve_b: f64,
    pub lp_mint: Pubkey,
    /// Share of LP supply that has been burned, 0-100
    pub burn_percent: f64,
}

impl PoolInfo {
    /// `(reserve_in, reserve_out)` when swapping `input_mint` for the other side.
    pub fn reserves_for(&self, input_mint: &Pubkey) -> Option<(f64, f64)> {
        if *input_mint == self.mint_a {
            Some((self.reserve_a, self.reserve_b))
        } else if *input_mint == self.mint_b {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// Spot price of one `mint` in units of the other side.
    pub fn price_of(&self, mint: &Pubkey) -> Option<f64> {
        let (reserve_mint, reserve_other) = self.reserves_for(mint)?;
        (reserve_mint > 0.0).then(|| reserve_other / reserve_mint)
    }

    /// Quote a swap of `amount_in` of `input_mint`.
    pub fn quote(&self, input_mint: &Pubkey, amount_in: f64) -> Result<f64> {
        let (reserve_in, reserve_out) = self.reserves_for(input_mint).ok_or_else(|| {
            SniperError::NotFound(format!("mint {input_mint} not in pool {}", self.id))
        })?;
        Ok(quote_exact_in(reserve_in, reserve_out, amount_in, DEFAULT_FEE_BPS))
    }
}

#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// The deepest pool pairing `mint` with `quote_mint`.
    async fn find_pool(&self, mint: &Pubkey, quote_mint: &Pubkey) -> Result<PoolInfo>;
}

/// Raydium API v3 pool lookup.
pub struct RaydiumPoolRegistry {
    http_client: Client,
    base_url: String,
}

impl RaydiumPoolRegistry {
    pub fn new(http_client: Client, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    data: Option<PoolPage>,
}

#[derive(Debug, Deserialize)]
struct PoolPage {
    data: Vec<ApiPool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPool {
    id: String,
    program_id: String,
    mint_a: ApiMint,
    mint_b: ApiMint,
    mint_amount_a: f64,
    mint_amount_b: f64,
    lp_mint: ApiMint,
    #[serde(default)]
    burn_percent: f64,
}

#[derive(Debug, Deserialize)]
struct ApiMint {
    address: String,
}

impl TryFrom<ApiPool> for PoolInfo {
    type Error = SniperError;

    fn try_from(pool: ApiPool) -> Result<Self> {
        Ok(Self {
            id: parse_key(&pool.id)?,
            program_id: parse_key(&pool.program_id)?,
            mint_a: parse_key(&pool.mint_a.address)?,
            mint_b: parse_key(&pool.mint_b.address)?,
            reserve_a: pool.mint_amount_a,
            reserve_b: pool.mint_amount_b,
            lp_mint: parse_key(&pool.lp_mint.address)?,
            burn_percent: pool.burn_percent,
        })
    }
}

fn parse_key(raw: &str) -> Result<Pubkey> {
    Pubkey::from_str(raw).map_err(|e| SniperError::MalformedData(format!("address `{raw}`: {e}")))
}

#[async_trait]
impl PoolRegistry for RaydiumPoolRegistry {
    #[instrument(skip(self), fields(mint = %mint))]
    async fn find_pool(&self, mint: &Pubkey, quote_mint: &Pubkey) -> Result<PoolInfo> {
        let url = format!("{}/pools/info/mint", self.base_url);
        let response: ApiResponse = self
            .http_client
            .get(&url)
            .query(&[
                ("mint1", mint.to_string()),
                ("mint2", quote_mint.to_string()),
                ("poolType", "standard".to_string()),
                ("poolSortField", "liquidity".to_string()),
                ("sortType", "desc".to_string()),
                ("pageSize", "1".to_string()),
                ("page", "1".to_string()),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(SniperError::from_http)?
            .json()
            .await
            .map_err(SniperError::from_http)?;

        if !response.success {
            return Err(SniperError::MalformedData("pool registry reported failure".into()));
        }

        let pool = response
            .data
            .and_then(|page| page.data.into_iter().next())
            .ok_or_else(|| SniperError::NotFound(format!("no pool for {mint}")))?;

        debug!(pool = %pool.id, "Resolved pool");
        PoolInfo::try_from(pool)
    }
}
