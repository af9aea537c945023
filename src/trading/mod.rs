//! Trade execution and profit monitoring.

pub mod controller;
pub mod submitter;
pub mod types;

pub use controller::{TradeController, TradeSettings};
pub use submitter::{PaperTrader, TradeSubmitter};
pub use types::{should_sell, TradePosition, TradeReceipt};
