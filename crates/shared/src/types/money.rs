//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in Tally is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places reported percentages are rounded to.
pub const PERCENT_DECIMAL_PLACES: u32 = 2;

/// Sums a sequence of amounts.
#[must_use]
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().sum()
}

/// Returns `part / whole * 100` without rounding, or zero when `whole` is zero.
#[must_use]
pub fn raw_percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Returns `part / whole * 100` rounded half away from zero to 2 decimal places.
///
/// A zero `whole` yields zero rather than an error.
#[must_use]
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    raw_percentage(part, whole)
        .round_dp_with_strategy(PERCENT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
