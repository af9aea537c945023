//! pool-sniper - new liquidity pool discovery, vetting and trading for Solana
//!
//! Watches an AMM program for pool creations, resolves the traded token,
//! runs it through a battery of safety checks behind a rate-limited call
//! scheduler, and buys tokens that pass.

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod guard;
pub mod market;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod trading;
pub mod types;
pub mod verification;

// Re-export main types for convenience
pub use config::{NetworkIds, SniperConfig, SniperConfigBuilder};
pub use coordinator::{Coordinator, Gateways, PipelineOutcome};
pub use error::{Result, SniperError};
pub use types::{DiscoveryEvent, Resolution, TokenPair};
