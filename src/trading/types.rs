//! Trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Result of a submitted swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub signature: String,
    /// Amount given up, in UI units of the input side
    pub input_amount: f64,
    /// Amount received, in UI units of the output side
    pub output_amount: f64,
}

/// An open position awaiting its sell trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePosition {
    pub token_address: Pubkey,
    /// Native units paid per token
    pub buy_price: f64,
    /// Sell once the spot price reaches this
    pub target_price: f64,
    /// Tokens held
    pub token_amount: f64,
    pub buy_signature: String,
    pub opened_at: DateTime<Utc>,
}

/// Whether the sell trigger fires at `current_price`.
///
/// With the default factor of 0.5 this holds whenever the price is at least
/// half the entry, so a fresh position qualifies on its first poll. Kept as
/// configured pending product review.
pub fn should_sell(current_price: f64, buy_price: f64, take_profit_factor: f64) -> bool {
    current_price >= buy_price * take_profit_factor
}
