//! Decimal round-half-up arithmetic
//!
//! Feature values are rounded in base ten so results are reproducible
//! independent of binary floating point rounding. `f64` operands are lifted
//! into [`Decimal`], divided, rounded with midpoint-away-from-zero (the
//! classic "half up") and lowered back to `f64`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept by the averaging features
pub const FEATURE_SCALE: u32 = 10;

/// Fractional digits kept by range normalization
pub const NORMALIZE_SCALE: u32 = 3;

/// Divide `numerator` by `denominator` and round half up to `scale` digits.
///
/// Returns `None` when either operand is not finite, does not fit a
/// [`Decimal`], or the denominator is zero.
pub fn divide_half_up(numerator: f64, denominator: f64, scale: u32) -> Option<f64> {
    let n = Decimal::from_f64(numerator)?;
    let d = Decimal::from_f64(denominator)?;
    divide_decimal_half_up(n, d, scale)
}

/// Decimal flavour of [`divide_half_up`] for callers that already hold decimals
pub fn divide_decimal_half_up(numerator: Decimal, denominator: Decimal, scale: u32) -> Option<f64> {
    numerator
        .checked_div(denominator)?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Round `value` half up to `scale` fractional digits
pub fn round_half_up(value: f64, scale: u32) -> Option<f64> {
    Decimal::from_f64(value)?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Integer division rounded half up, for positive operands.
///
/// Exact: the remainder decides the rounding, no fractional digits are kept.
pub fn divide_integers_half_up(numerator: u64, denominator: u64) -> u64 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder * 2 >= denominator {
        quotient + 1
    } else {
        quotient
    }
}
