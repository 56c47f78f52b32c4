//! Monetary rounding and percentage helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places every monetary amount is rounded to.
pub const MONEY_DP: u32 = 2;

/// Largest input amount the calculator accepts (one trillion).
///
/// Keeps every product and sum well inside `Decimal`'s range.
pub const MAX_CALCULABLE_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest percentage accepted for a configured rate or an increase.
pub const MAX_RATE_PCT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Rounds an amount to cents, half away from zero.
///
/// The result always carries two decimal places, so `3000` becomes `3000.00`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("516.305").unwrap()), Decimal::from_str("516.31").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-0.125").unwrap()), Decimal::from_str("-0.13").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

/// Applies a percentage rate to an amount and rounds the result to cents.
pub fn apply_rate(amount: Decimal, rate_pct: Decimal) -> Decimal {
    round_money(amount * rate_pct / Decimal::ONE_HUNDRED)
}

/// Returns `delta` as a percentage of `base`, rounded to two places.
///
/// Zero when `base` is zero.
pub fn percentage_variation(delta: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    round_money(delta / base * Decimal::ONE_HUNDRED)
}
