//! Native-asset USD price feed.

use crate::error::{Result, SniperError};
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current USD price of one unit of the native asset.
    async fn native_usd_price(&self) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    solana: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: f64,
}

/// CoinGecko simple-price lookup.
pub struct HttpPriceOracle {
    http_client: Client,
    url: String,
}

impl HttpPriceOracle {
    pub fn new(http_client: Client, url: String) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    #[instrument(skip(self))]
    async fn native_usd_price(&self) -> Result<f64> {
        let response: SimplePriceResponse = self
            .http_client
            .get(&self.url)
            .query(&[("ids", "solana"), ("vs_currencies", "usd")])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(SniperError::from_http)?
            .json()
            .await
            .map_err(SniperError::from_http)?;

        let price = response.solana.usd;
        if !price.is_finite() || price <= 0.0 {
            return Err(SniperError::MalformedData(format!("native price {price}")));
        }
        debug!(price, "Fetched native USD price");
        Ok(price)
    }
}

/// Short-lived cache in front of another oracle.
pub struct CachedPriceOracle {
    inner: Arc<dyn PriceOracle>,
    cache: Cache<(), f64>,
}

impl CachedPriceOracle {
    pub fn new(inner: Arc<dyn PriceOracle>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl PriceOracle for CachedPriceOracle {
    async fn native_usd_price(&self) -> Result<f64> {
        self.cache
            .try_get_with((), self.inner.native_usd_price())
            .await
            .map_err(|err: Arc<SniperError>| (*err).clone())
    }
}
