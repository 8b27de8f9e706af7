//! Budget error types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{BudgetId, TagId};
use thiserror::Error;

/// Budget-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Budget not found, or not owned by the caller.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// Budget name is blank.
    #[error("Budget name cannot be empty")]
    EmptyName,

    /// Currency is not a 3-letter ISO code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Budget range ends before it starts.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: DateTime<Utc>,
        /// End date.
        end: DateTime<Utc>,
    },

    /// Budget has no items.
    #[error("Budget must have at least one item")]
    NoItems,

    /// Two items share the same tag.
    #[error("Duplicate budget item for tag \"{tag_name}\"")]
    DuplicateTag {
        /// Tag ID.
        tag_id: TagId,
        /// Tag name.
        tag_name: String,
    },

    /// More than one Miscellaneous item.
    #[error("Duplicate budget item for Misc")]
    DuplicateMisc,

    /// Item references a tag the user does not own.
    #[error("Tag not found: {0}")]
    TagNotOwned(TagId),

    /// Item expected amount is zero or negative.
    #[error("Expected amount for \"{label}\" must be positive, got {amount}")]
    NonPositiveAmount {
        /// Tag name or "Misc".
        label: String,
        /// Offending amount.
        amount: Decimal,
    },
}

impl BudgetError {
    /// Returns true for malformed budget input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}
