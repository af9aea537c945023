//! Core types and data structures shared across the pool sniper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// A liquidity-pool creation observed on the event subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
    /// Signature of the transaction that created the pool
    pub transaction_id: String,
    /// When the subscription delivered the event
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveryEvent {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            discovered_at: Utc::now(),
        }
    }
}

/// The two mints a pool-creation instruction pairs together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
}

impl TokenPair {
    pub fn new(token_a: Pubkey, token_b: Pubkey) -> Self {
        Self { token_a, token_b }
    }

    /// Both sides are the wrapped native asset; nothing to trade.
    pub fn is_native_pair(&self, native_mint: &Pubkey) -> bool {
        self.token_a == *native_mint && self.token_b == *native_mint
    }

    /// The member that is not the native mint. Falls back to `token_a`
    /// when neither side is native.
    pub fn candidate_token(&self, native_mint: &Pubkey) -> Pubkey {
        if self.token_a == *native_mint {
            self.token_b
        } else {
            self.token_a
        }
    }
}

/// Outcome of turning a discovery event into a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Pair(TokenPair),
    /// Instruction absent or too few accounts on it
    NoValidPair,
    /// Both sides are the native mint, excluded by policy
    NativePairSkipped,
}
