//! Budget input validation.
//!
//! Runs on create/update only. The analytics engine trusts stored budgets.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tally_shared::types::TagId;

use super::error::BudgetError;
use super::types::{BudgetInput, Tag};

/// Validates a budget before it is written.
///
/// `user_tags` are the tags owned by the budget's user; every non-null item
/// tag must be among them.
///
/// # Errors
///
/// Returns the first violation found: blank name, malformed currency,
/// inverted range, no items, non-positive amount, foreign tag, or a
/// duplicated tag (including a second Misc item).
pub fn validate_budget_input(input: &BudgetInput, user_tags: &[Tag]) -> Result<(), BudgetError> {
    if input.name.trim().is_empty() {
        return Err(BudgetError::EmptyName);
    }

    if !is_currency_code(&input.currency) {
        return Err(BudgetError::InvalidCurrency(input.currency.clone()));
    }

    if input.start_date > input.end_date {
        return Err(BudgetError::InvalidDateRange {
            start: input.start_date,
            end: input.end_date,
        });
    }

    if input.items.is_empty() {
        return Err(BudgetError::NoItems);
    }

    let mut seen_tags: HashSet<TagId> = HashSet::with_capacity(input.items.len());
    let mut seen_misc = false;

    for item in &input.items {
        let tag = match item.tag_id {
            Some(tag_id) => Some(
                user_tags
                    .iter()
                    .find(|tag| tag.id == tag_id)
                    .ok_or(BudgetError::TagNotOwned(tag_id))?,
            ),
            None => None,
        };

        if item.expected_amount <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveAmount {
                label: tag.map_or_else(|| "Misc".to_string(), |tag| tag.name.clone()),
                amount: item.expected_amount,
            });
        }

        match tag {
            Some(tag) => {
                if !seen_tags.insert(tag.id) {
                    return Err(BudgetError::DuplicateTag {
                        tag_id: tag.id,
                        tag_name: tag.name.clone(),
                    });
                }
            }
            None => {
                if seen_misc {
                    return Err(BudgetError::DuplicateMisc);
                }
                seen_misc = true;
            }
        }
    }

    Ok(())
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
