//! Constant-product swap quoting.
//!
//! Used to simulate buys and sells against a pool's published reserves.
//! Accuracy against the live program is not a goal; the figures only
//! need to expose pools whose round trip loses most of its value.

/// Raydium AMM v4 trade fee.
pub const DEFAULT_FEE_BPS: u32 = 25;

/// Output of swapping `amount_in` into an `x*y=k` pool.
pub fn quote_exact_in(reserve_in: f64, reserve_out: f64, amount_in: f64, fee_bps: u32) -> f64 {
    if reserve_in <= 0.0 || reserve_out <= 0.0 || amount_in <= 0.0 {
        return 0.0;
    }
    let effective_in = amount_in * (1.0 - fee_bps as f64 / 10_000.0);
    reserve_out * effective_in / (reserve_in + effective_in)
}

/// Minimum acceptable output after `slippage_bps`.
pub fn min_out(expected: f64, slippage_bps: u16) -> f64 {
    expected * (1.0 - slippage_bps as f64 / 10_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_trade_close_to_spot() {
        let out = quote_exact_in(1_000.0, 1_000_000.0, 1.0, 0);
        assert!((out - 999.0).abs() < 0.01);
    }

    #[test]
    fn test_fee_reduces_output() {
        let without_fee = quote_exact_in(100.0, 100.0, 10.0, 0);
        let with_fee = quote_exact_in(100.0, 100.0, 10.0, DEFAULT_FEE_BPS);
        assert!(with_fee < without_fee);
    }

    #[test]
    fn test_empty_pool_quotes_nothing() {
        assert_eq!(quote_exact_in(0.0, 100.0, 1.0, 25), 0.0);
        assert_eq!(quote_exact_in(100.0, 100.0, 0.0, 25), 0.0);
    }

    #[test]
    fn test_min_out() {
        assert!((min_out(200.0, 100) - 198.0).abs() < 1e-9);
    }
}
