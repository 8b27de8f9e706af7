//! Budget data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{BudgetId, BudgetItemId, TagId, TransactionId, UserId};

use super::pace::SpendingPace;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money leaving the user.
    Expense,
    /// Money reaching the user.
    Income,
}

/// Tag metadata used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag ID.
    pub id: TagId,
    /// Tag name.
    pub name: String,
    /// Display color (e.g. `#22c55e`).
    pub color: String,
}

/// A transaction as read from the transaction store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// Expense or income.
    pub transaction_type: TransactionType,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the transaction happened.
    pub occurred_at: DateTime<Utc>,
    /// Full tag set. Not used for budget matching.
    pub tags: Vec<Tag>,
    /// The single tag used for budget matching.
    pub primary_tag: Option<Tag>,
}

impl Transaction {
    /// ID of the primary tag, if any.
    #[must_use]
    pub fn primary_tag_id(&self) -> Option<TagId> {
        self.primary_tag.as_ref().map(|tag| tag.id)
    }
}

/// One line of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    /// Budget item ID.
    pub id: BudgetItemId,
    /// Parent budget ID.
    pub budget_id: BudgetId,
    /// Matched tag; `None` is the Miscellaneous bucket.
    pub tag_id: Option<TagId>,
    /// Resolved tag metadata for `tag_id`.
    pub tag: Option<Tag>,
    /// Planned amount, always positive.
    pub expected_amount: Decimal,
}

impl BudgetItem {
    /// Returns true for the Miscellaneous item.
    #[must_use]
    pub const fn is_misc(&self) -> bool {
        self.tag_id.is_none()
    }

    /// Human-readable label: the tag name, or "Misc".
    #[must_use]
    pub fn label(&self) -> &str {
        match (&self.tag, self.tag_id) {
            (Some(tag), _) => &tag.name,
            (None, None) => "Misc",
            (None, Some(_)) => "Unknown tag",
        }
    }
}

/// A budget with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning user.
    pub user_id: UserId,
    /// Budget name.
    pub name: String,
    /// First instant covered (inclusive).
    pub start_date: DateTime<Utc>,
    /// Last instant covered (inclusive).
    pub end_date: DateTime<Utc>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Line items, in display order.
    pub items: Vec<BudgetItem>,
}

impl Budget {
    /// Sum of every item's expected amount.
    #[must_use]
    pub fn total_expected(&self) -> Decimal {
        self.items.iter().map(|item| item.expected_amount).sum()
    }

    /// Returns true if `at` lies within `[start_date, end_date]`.
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }

    /// Returns true if the transaction is in this budget's currency and date range.
    #[must_use]
    pub fn accepts(&self, transaction: &Transaction) -> bool {
        transaction.currency == self.currency && self.is_active_at(transaction.occurred_at)
    }

    /// Returns true if the budget has an item for `tag_id`.
    #[must_use]
    pub fn has_item_for(&self, tag_id: TagId) -> bool {
        self.items.iter().any(|item| item.tag_id == Some(tag_id))
    }
}

/// Expected vs. actual for one budget item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItemComparison {
    /// The compared item.
    pub item: BudgetItem,
    /// Planned amount.
    pub expected: Decimal,
    /// Matched spend.
    pub actual: Decimal,
    /// `actual - expected`.
    pub difference: Decimal,
    /// `actual / expected * 100`, 2 decimals; zero when nothing was expected.
    pub percentage: Decimal,
    /// Matched transactions.
    pub transactions: Vec<Transaction>,
}

/// Spend under a tag that has no budget item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    /// Offending tag.
    pub tag_id: TagId,
    /// Tag name.
    pub tag_name: String,
    /// Tag color.
    pub tag_color: String,
    /// Number of transactions.
    pub transaction_count: usize,
    /// Sum of their amounts.
    pub total_amount: Decimal,
    /// The transactions themselves.
    pub transactions: Vec<Transaction>,
}

/// Comparison totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonTotals {
    /// Sum of item expectations.
    pub total_expected: Decimal,
    /// Sum of item actuals plus alert spend.
    pub total_actual: Decimal,
    /// `total_actual - total_expected`.
    pub total_difference: Decimal,
}

/// Untagged spend left out because the budget has no Misc item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntaggedSpend {
    /// Number of untagged transactions.
    pub transaction_count: usize,
    /// Sum of their amounts.
    pub total_amount: Decimal,
}

/// Full budget vs. actual comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetComparison {
    /// The compared budget.
    pub budget: Budget,
    /// Per-item results, in budget item order.
    pub items: Vec<BudgetItemComparison>,
    /// Unbudgeted spend, in first-seen tag order.
    pub alerts: Vec<BudgetAlert>,
    /// Totals.
    pub totals: ComparisonTotals,
    /// Untagged spend excluded from items, alerts and totals.
    pub dropped_untagged: Option<UntaggedSpend>,
}

/// Headline numbers across the included budgets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverallHealth {
    /// Sum of expected amounts.
    pub total_expected: Decimal,
    /// Sum of matched spend.
    pub total_actual: Decimal,
    /// `total_expected - total_actual`.
    pub remaining: Decimal,
    /// `total_actual / total_expected * 100`, 2 decimals.
    pub overall_percentage: Decimal,
    /// Number of budgets included.
    pub active_count: usize,
    /// Currency the figures are in.
    pub currency: Option<String>,
}

/// Budget counts by risk band.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Budgets spent between the nearing-limit and over-budget thresholds.
    pub nearing_limit: usize,
    /// Budgets spent beyond the over-budget threshold.
    pub over_budget: usize,
    /// Number of budgets classified.
    pub total_active: usize,
}

/// Time position of the included budgets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeContext {
    /// Whole days until the earliest end date; negative once it has passed.
    pub days_remaining: i64,
    /// Whole days since the earliest start date, at least 1.
    pub days_elapsed: i64,
    /// Whole days from the earliest start to the earliest end.
    pub total_days: i64,
    /// Earliest end date among the included budgets.
    pub earliest_end_date: Option<DateTime<Utc>>,
    /// Spend pace relative to elapsed time.
    pub spending_pace: Option<SpendingPace>,
}

/// A tag ranked by accumulated spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSpender {
    /// Tag ID.
    pub tag_id: TagId,
    /// Tag name.
    pub tag_name: String,
    /// Tag color.
    pub tag_color: String,
    /// Accumulated spend.
    pub amount: Decimal,
    /// Share of total spend, 2 decimals.
    pub percentage: Decimal,
}

/// Figures computed over every budget regardless of activity or currency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverviewContext {
    /// Count of all budgets.
    pub total_budgets: usize,
    /// Sum of every item's expected amount, unconverted.
    pub total_expected_all: Decimal,
}

/// Dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BudgetsOverviewResponse {
    /// Headline numbers.
    pub overall_health: OverallHealth,
    /// Risk bands.
    pub risk_summary: RiskSummary,
    /// Time pace.
    pub time_context: TimeContext,
    /// Top tags by spend.
    pub top_spenders: Vec<TopSpender>,
    /// All-budget context.
    pub context: OverviewContext,
}

/// Input for one budget item on create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetItemInput {
    /// Tag, or `None` for Misc.
    pub tag_id: Option<TagId>,
    /// Planned amount.
    pub expected_amount: Decimal,
}

/// Input for creating or replacing a budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetInput {
    /// Budget name.
    pub name: String,
    /// First instant covered.
    pub start_date: DateTime<Utc>,
    /// Last instant covered.
    pub end_date: DateTime<Utc>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Line items, in display order.
    pub items: Vec<BudgetItemInput>,
}
