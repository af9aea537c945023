//! Off-chain market data: pool registry, native price feed and swap quoting.

pub mod pools;
pub mod price;
pub mod quote;

pub use pools::{PoolInfo, PoolRegistry, RaydiumPoolRegistry};
pub use price::{CachedPriceOracle, HttpPriceOracle, PriceOracle};
pub use quote::{min_out, quote_exact_in};
