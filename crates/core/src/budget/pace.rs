//! Spending pace estimation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spend relative to elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingPace {
    /// Spend ratio meaningfully above time ratio.
    Faster,
    /// Spend ratio meaningfully below time ratio.
    Slower,
}

/// Compares a spend ratio against a time ratio.
///
/// `tolerance` is relative: with `0.1` the spend ratio has to be more than
/// 10% above (or below) the time ratio before a pace is reported.
#[must_use]
pub fn classify_pace(
    spend_ratio: Decimal,
    time_ratio: Decimal,
    tolerance: Decimal,
) -> Option<SpendingPace> {
    let upper = time_ratio * (Decimal::ONE + tolerance);
    let lower = time_ratio * (Decimal::ONE - tolerance);

    if spend_ratio > upper {
        Some(SpendingPace::Faster)
    } else if spend_ratio < lower {
        Some(SpendingPace::Slower)
    } else {
        None
    }
}

/// Pace of `total_actual / total_expected` against `days_elapsed / total_days`.
///
/// Undefined (`None`) when nothing is expected or the window has no length.
#[must_use]
pub fn spending_pace(
    total_actual: Decimal,
    total_expected: Decimal,
    days_elapsed: i64,
    total_days: i64,
    tolerance: Decimal,
) -> Option<SpendingPace> {
    if total_expected <= Decimal::ZERO || total_days <= 0 {
        return None;
    }

    let spend_ratio = total_actual / total_expected;
    let time_ratio = Decimal::from(days_elapsed) / Decimal::from(total_days);

    classify_pace(spend_ratio, time_ratio, tolerance)
}
