//! Budget comparison engine.
//!
//! Partitions a budget's transactions against its items and produces the
//! expected vs. actual breakdown plus unbudgeted-spend alerts.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::{TagId, percentage, sum_amounts};

use super::types::{
    Budget, BudgetAlert, BudgetComparison, BudgetItem, BudgetItemComparison, ComparisonTotals,
    Transaction, UntaggedSpend,
};

/// Transactions with a primary tag that no budget item covers.
#[derive(Debug, Clone)]
pub struct AlertBucket {
    /// The uncovered tag.
    pub tag_id: TagId,
    /// Its transactions, in input order.
    pub transactions: Vec<Transaction>,
}

/// One budget's transactions split by primary tag.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Transactions without a primary tag, collected whether or not the
    /// budget has a Misc item.
    pub misc: Vec<Transaction>,
    /// Transactions whose primary tag has a budget item.
    pub tagged: HashMap<TagId, Vec<Transaction>>,
    /// Transactions whose primary tag has no budget item, in first-seen order.
    pub alerts: Vec<AlertBucket>,
}

/// Splits `transactions` into misc, item and alert buckets.
///
/// Transactions outside the budget's currency or date range are skipped.
#[must_use]
pub fn partition(budget: &Budget, transactions: Vec<Transaction>) -> Partition {
    let mut result = Partition::default();
    let mut alert_index: HashMap<TagId, usize> = HashMap::new();

    for transaction in transactions {
        if !budget.accepts(&transaction) {
            continue;
        }

        match transaction.primary_tag_id() {
            None => result.misc.push(transaction),
            Some(tag_id) if budget.has_item_for(tag_id) => {
                result.tagged.entry(tag_id).or_default().push(transaction);
            }
            Some(tag_id) => {
                let index = *alert_index.entry(tag_id).or_insert_with(|| {
                    result.alerts.push(AlertBucket {
                        tag_id,
                        transactions: Vec::new(),
                    });
                    result.alerts.len() - 1
                });
                result.alerts[index].transactions.push(transaction);
            }
        }
    }

    result
}

/// Service for budget vs. actual comparisons.
pub struct ComparisonService;

impl ComparisonService {
    /// Compares a budget against its transactions.
    ///
    /// Untagged transactions only count when the budget has a Misc item;
    /// otherwise they are reported in `dropped_untagged` and left out of the
    /// totals.
    #[must_use]
    pub fn compare(budget: Budget, transactions: Vec<Transaction>) -> BudgetComparison {
        let Partition {
            mut misc,
            mut tagged,
            alerts,
        } = partition(&budget, transactions);

        let items: Vec<BudgetItemComparison> = budget
            .items
            .iter()
            .map(|item| {
                let bucket = match item.tag_id {
                    None => std::mem::take(&mut misc),
                    Some(tag_id) => tagged.remove(&tag_id).unwrap_or_default(),
                };
                Self::compare_item(item, bucket)
            })
            .collect();

        let alerts: Vec<BudgetAlert> = alerts.into_iter().filter_map(Self::alert).collect();

        let dropped_untagged = (!misc.is_empty()).then(|| UntaggedSpend {
            transaction_count: misc.len(),
            total_amount: sum_amounts(misc.iter().map(|t| t.amount)),
        });

        let total_expected: Decimal = items.iter().map(|i| i.expected).sum();
        let total_actual: Decimal = items.iter().map(|i| i.actual).sum::<Decimal>()
            + alerts.iter().map(|a| a.total_amount).sum::<Decimal>();

        BudgetComparison {
            budget,
            items,
            alerts,
            totals: ComparisonTotals {
                total_expected,
                total_actual,
                total_difference: total_actual - total_expected,
            },
            dropped_untagged,
        }
    }

    /// Expected vs. actual for a single item.
    #[must_use]
    pub fn compare_item(item: &BudgetItem, transactions: Vec<Transaction>) -> BudgetItemComparison {
        let expected = item.expected_amount;
        let actual = sum_amounts(transactions.iter().map(|t| t.amount));
        let percentage = if expected > Decimal::ZERO {
            percentage(actual, expected)
        } else {
            Decimal::ZERO
        };

        BudgetItemComparison {
            item: item.clone(),
            expected,
            actual,
            difference: actual - expected,
            percentage,
            transactions,
        }
    }

    fn alert(bucket: AlertBucket) -> Option<BudgetAlert> {
        let tag = bucket.transactions.first()?.primary_tag.clone()?;

        Some(BudgetAlert {
            tag_id: bucket.tag_id,
            tag_name: tag.name,
            tag_color: tag.color,
            transaction_count: bucket.transactions.len(),
            total_amount: sum_amounts(bucket.transactions.iter().map(|t| t.amount)),
            transactions: bucket.transactions,
        })
    }
}
