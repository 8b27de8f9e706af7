//! Budget comparison and overview analytics.
//!
//! - [`comparison`]: expected vs. actual for a single budget
//! - [`overview`]: roll-up across the user's active budgets
//! - [`validation`]: checks run before a budget is written

pub mod comparison;
pub mod error;
pub mod overview;
pub mod pace;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use comparison::{AlertBucket, ComparisonService, Partition, partition};
pub use error::BudgetError;
pub use overview::{
    OverviewSelection, OverviewService, OverviewSettings, ceil_days, select_budgets,
};
pub use pace::{SpendingPace, classify_pace, spending_pace};
pub use types::{
    Budget, BudgetAlert, BudgetComparison, BudgetInput, BudgetItem, BudgetItemComparison,
    BudgetItemInput, BudgetsOverviewResponse, ComparisonTotals, OverallHealth, OverviewContext,
    RiskSummary, Tag, TimeContext, TopSpender, Transaction, TransactionType, UntaggedSpend,
};
pub use validation::validate_budget_input;
