//! Period preset error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised when constructing a period preset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Month outside 1-12.
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    /// Year outside the supported range.
    #[error("Year out of range: {0}")]
    YearOutOfRange(i32),

    /// Custom range whose start is after its end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}
