//! Runtime configuration for the sniper.
//!
//! Every tunable has a default matching the production constants, so an
//! empty TOML file is a valid configuration apart from the wallet address.

use crate::error::{Result, SniperError};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

/// Raydium liquidity pool v4 program.
pub const RAYDIUM_AMM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
/// Wrapped SOL mint.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperConfig {
    /// HTTP RPC endpoint
    pub rpc_url: String,
    /// Websocket endpoint for the log subscription
    pub ws_url: String,
    /// Public address of the trading wallet
    pub wallet_address: String,
    /// Program whose pool-creation logs we watch
    pub amm_program_id: String,
    /// Wrapped native asset mint
    pub native_mint: String,
    /// Native-asset USD price endpoint
    pub price_api_url: String,
    /// Pool registry base URL
    pub pool_api_url: String,

    /// Minimum spacing between scheduled remote calls
    pub pacing_interval_ms: u64,
    /// Rate-limit retries per scheduled call
    pub max_retries: u32,
    /// First retry delay; doubles on every retry
    pub retry_base_delay_ms: u64,
    /// Attempts made by the bounded-retry wrapper
    pub wrapper_attempts: usize,

    /// Pause between consecutive checks of the battery
    pub check_interval_ms: u64,
    /// Verdict cache capacity
    pub verdict_cache_capacity: usize,
    /// Relative round-trip loss above which a token is a honeypot
    pub honeypot_threshold: f64,
    /// Maximum combined share of the top five holders
    pub max_top_holder_share: f64,
    /// Native amount (lamports) used to probe trade and honeypot simulations
    pub probe_lamports: u64,

    /// USD notional spent on every buy
    pub buy_amount_usd: f64,
    /// Sell once current price >= buy price * factor
    pub take_profit_factor: f64,
    /// Price poll interval while holding a position
    pub monitor_interval_ms: u64,
    /// Slippage tolerance in basis points
    pub slippage_bps: u16,

    /// Delay between subscription reconnect attempts
    pub reconnect_delay_ms: u64,
    /// Reconnect attempts before giving up
    pub reconnect_attempts: u32,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            ws_url: "wss://api.mainnet-beta.solana.com".to_string(),
            wallet_address: String::new(),
            amm_program_id: RAYDIUM_AMM_V4.to_string(),
            native_mint: NATIVE_MINT.to_string(),
            price_api_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            pool_api_url: "https://api-v3.raydium.io".to_string(),
            pacing_interval_ms: 500,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            wrapper_attempts: 5,
            check_interval_ms: 1500,
            verdict_cache_capacity: 150,
            honeypot_threshold: 0.30,
            max_top_holder_share: 0.50,
            probe_lamports: 10_000_000,
            buy_amount_usd: 15.0,
            take_profit_factor: 0.5,
            monitor_interval_ms: 30_000,
            slippage_bps: 100,
            reconnect_delay_ms: 5_000,
            reconnect_attempts: 5,
        }
    }
}

/// Addresses parsed out of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkIds {
    pub wallet: Pubkey,
    pub amm_program: Pubkey,
    pub native_mint: Pubkey,
}

impl SniperConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SniperError::FatalStartup(format!("failed to read {path}: {e}")))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| SniperError::FatalStartup(format!("failed to parse config: {e}")))
    }

    /// Parse every address; an invalid one is fatal at startup.
    pub fn validate(&self) -> Result<NetworkIds> {
        Ok(NetworkIds {
            wallet: parse_address("wallet_address", &self.wallet_address)?,
            amm_program: parse_address("amm_program_id", &self.amm_program_id)?,
            native_mint: parse_address("native_mint", &self.native_mint)?,
        })
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn parse_address(field: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| SniperError::FatalStartup(format!("invalid {field} `{value}`: {e}")))
}

/// Builder for programmatic construction.
pub struct SniperConfigBuilder {
    config: SniperConfig,
}

impl SniperConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SniperConfig::default(),
        }
    }

    pub fn with_wallet(mut self, wallet: &Pubkey) -> Self {
        self.config.wallet_address = wallet.to_string();
        self
    }

    pub fn with_amm_program(mut self, program: &Pubkey) -> Self {
        self.config.amm_program_id = program.to_string();
        self
    }

    pub fn with_native_mint(mut self, mint: &Pubkey) -> Self {
        self.config.native_mint = mint.to_string();
        self
    }

    /// Scheduler pacing, retry ceiling and first retry delay.
    pub fn with_scheduler(mut self, pacing_ms: u64, max_retries: u32, retry_base_ms: u64) -> Self {
        self.config.pacing_interval_ms = pacing_ms;
        self.config.max_retries = max_retries;
        self.config.retry_base_delay_ms = retry_base_ms;
        self
    }

    pub fn with_check_interval(mut self, interval_ms: u64) -> Self {
        self.config.check_interval_ms = interval_ms;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.verdict_cache_capacity = capacity;
        self
    }

    pub fn with_take_profit(mut self, factor: f64, monitor_interval_ms: u64) -> Self {
        self.config.take_profit_factor = factor;
        self.config.monitor_interval_ms = monitor_interval_ms;
        self
    }

    pub fn with_reconnect(mut self, delay_ms: u64, attempts: u32) -> Self {
        self.config.reconnect_delay_ms = delay_ms;
        self.config.reconnect_attempts = attempts;
        self
    }

    pub fn build(self) -> SniperConfig {
        self.config
    }
}

impl Default for SniperConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
