//! Monetary rounding
//!
//! Rounding happens on the exact decimal expansion of the binary value,
//! so a product such as `1.115` (stored as `1.11499999…`) is never
//! mistaken for a tie.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept by the `multiply` rule
pub const MONEY_DECIMALS: u32 = 2;

/// Round to `places` decimals, ties to even
///
/// Only values whose binary representation is exactly halfway count as
/// ties: `0.125` rounds to `0.12`, `1.115` to `1.11`. Values too large
/// for a [`Decimal`] carry no fractional digits and are returned as is.
#[must_use]
pub fn round_half_even(value: f64, places: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
    // The decimal text parses to the nearest f64
    rounded.to_string().parse().unwrap_or(value)
}

/// Round to cents
#[must_use]
pub fn round_money(value: f64) -> f64 {
    round_half_even(value, MONEY_DECIMALS)
}
