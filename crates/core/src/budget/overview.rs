//! Budget overview aggregation.
//!
//! Rolls the user's currently-active budgets into one dashboard payload:
//! health, risk bands, time pace and top spending tags.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tally_shared::AnalyticsConfig;
use tally_shared::types::{BudgetId, TagId, percentage, raw_percentage};

use super::pace::spending_pace;
use super::types::{
    Budget, BudgetsOverviewResponse, OverallHealth, OverviewContext, RiskSummary, Tag,
    TimeContext, TopSpender, Transaction,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Thresholds used when classifying budgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewSettings {
    /// Lower bound (inclusive) of the nearing-limit band, in percent.
    pub nearing_limit_percent: Decimal,
    /// Upper bound (inclusive) of the nearing-limit band; above it is over budget.
    pub over_budget_percent: Decimal,
    /// Relative pace tolerance as a fraction (`0.1` = 10%).
    pub pace_tolerance: Decimal,
    /// Number of top spenders reported.
    pub top_spenders_limit: usize,
}

impl Default for OverviewSettings {
    fn default() -> Self {
        Self::from(&AnalyticsConfig::default())
    }
}

impl From<&AnalyticsConfig> for OverviewSettings {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            nearing_limit_percent: Decimal::from(config.nearing_limit_percent),
            over_budget_percent: Decimal::from(config.over_budget_percent),
            pace_tolerance: Decimal::from(config.pace_tolerance_percent) / Decimal::ONE_HUNDRED,
            top_spenders_limit: config.top_spenders_limit,
        }
    }
}

/// Budgets that take part in the overview.
#[derive(Debug, Clone)]
pub struct OverviewSelection<'a> {
    /// Currency shared by the most active budgets.
    pub primary_currency: Option<String>,
    /// Active budgets in the primary currency, in input order.
    pub budgets: Vec<&'a Budget>,
}

/// Picks the active budgets in the primary currency.
///
/// The primary currency is the one shared by the largest number of active
/// budgets; ties go to the currency encountered first.
#[must_use]
pub fn select_budgets(budgets: &[Budget], now: DateTime<Utc>) -> OverviewSelection<'_> {
    let active: Vec<&Budget> = budgets.iter().filter(|b| b.is_active_at(now)).collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for budget in &active {
        match counts.iter_mut().find(|(code, _)| *code == budget.currency) {
            Some((_, count)) => *count += 1,
            None => counts.push((budget.currency.as_str(), 1)),
        }
    }

    // max_by_key keeps the last maximum, so fold to keep the first.
    let primary = counts
        .iter()
        .fold(None::<(&str, usize)>, |best, &(code, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((code, count)),
        })
        .map(|(code, _)| code.to_string());

    let included = match &primary {
        Some(code) => active.into_iter().filter(|b| b.currency == *code).collect(),
        None => Vec::new(),
    };

    OverviewSelection {
        primary_currency: primary,
        budgets: included,
    }
}

/// Whole days in `delta`, rounded towards positive infinity.
#[must_use]
pub fn ceil_days(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds();
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

/// Spend accumulated per tag across budgets, in first-seen order.
#[derive(Debug, Default)]
struct TagSpending {
    index: HashMap<TagId, usize>,
    entries: Vec<(Tag, Decimal)>,
}

impl TagSpending {
    fn add(&mut self, tag: &Tag, amount: Decimal) {
        match self.index.get(&tag.id) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(tag.id, self.entries.len());
                self.entries.push((tag.clone(), amount));
            }
        }
    }

    /// Highest spend first; equal amounts ordered by tag id.
    fn top(mut self, limit: usize, total_actual: Decimal) -> Vec<TopSpender> {
        self.entries
            .sort_by(|(a_tag, a_amount), (b_tag, b_amount)| {
                b_amount.cmp(a_amount).then_with(|| a_tag.id.cmp(&b_tag.id))
            });

        self.entries
            .into_iter()
            .take(limit)
            .map(|(tag, amount)| TopSpender {
                tag_id: tag.id,
                tag_name: tag.name,
                tag_color: tag.color,
                amount,
                percentage: percentage(amount, total_actual),
            })
            .collect()
    }
}

/// Service for the multi-budget dashboard overview.
pub struct OverviewService;

impl OverviewService {
    /// Builds the overview payload.
    ///
    /// `budgets` is every budget the user owns. `transactions` holds the
    /// transactions fetched for the selected budgets (see [`select_budgets`]);
    /// a selected budget without an entry counts as having no spend.
    #[must_use]
    pub fn build(
        budgets: &[Budget],
        transactions: &HashMap<BudgetId, Vec<Transaction>>,
        now: DateTime<Utc>,
        settings: &OverviewSettings,
    ) -> BudgetsOverviewResponse {
        let context = OverviewContext {
            total_budgets: budgets.len(),
            total_expected_all: budgets.iter().map(Budget::total_expected).sum(),
        };

        let selection = select_budgets(budgets, now);
        if selection.budgets.is_empty() {
            return BudgetsOverviewResponse {
                context,
                ..BudgetsOverviewResponse::default()
            };
        }

        let mut total_expected = Decimal::ZERO;
        let mut total_actual = Decimal::ZERO;
        let mut risk = RiskSummary {
            total_active: selection.budgets.len(),
            ..RiskSummary::default()
        };
        let mut tag_spending = TagSpending::default();

        for budget in &selection.budgets {
            let budget_expected = budget.total_expected();
            let mut budget_actual = Decimal::ZERO;

            for transaction in transactions
                .get(&budget.id)
                .into_iter()
                .flatten()
                .filter(|t| budget.accepts(t))
            {
                budget_actual += transaction.amount;
                if let Some(tag) = &transaction.primary_tag {
                    tag_spending.add(tag, transaction.amount);
                }
            }

            let budget_percentage = raw_percentage(budget_actual, budget_expected);
            if budget_percentage > settings.over_budget_percent {
                risk.over_budget += 1;
            } else if budget_percentage >= settings.nearing_limit_percent {
                risk.nearing_limit += 1;
            }

            total_expected += budget_expected;
            total_actual += budget_actual;
        }

        let time_context = Self::time_context(
            &selection.budgets,
            now,
            total_actual,
            total_expected,
            settings,
        );

        BudgetsOverviewResponse {
            overall_health: OverallHealth {
                total_expected,
                total_actual,
                remaining: total_expected - total_actual,
                overall_percentage: percentage(total_actual, total_expected),
                active_count: selection.budgets.len(),
                currency: selection.primary_currency,
            },
            risk_summary: risk,
            time_context,
            top_spenders: tag_spending.top(settings.top_spenders_limit, total_actual),
            context,
        }
    }

    fn time_context(
        budgets: &[&Budget],
        now: DateTime<Utc>,
        total_actual: Decimal,
        total_expected: Decimal,
        settings: &OverviewSettings,
    ) -> TimeContext {
        let (Some(earliest_start), Some(earliest_end)) = (
            budgets.iter().map(|b| b.start_date).min(),
            budgets.iter().map(|b| b.end_date).min(),
        ) else {
            return TimeContext::default();
        };

        let days_remaining = ceil_days(earliest_end - now);
        let days_elapsed = ceil_days(now - earliest_start).max(1);
        let total_days = ceil_days(earliest_end - earliest_start);

        TimeContext {
            days_remaining,
            days_elapsed,
            total_days,
            earliest_end_date: Some(earliest_end),
            spending_pace: spending_pace(
                total_actual,
                total_expected,
                days_elapsed,
                total_days,
                settings.pace_tolerance,
            ),
        }
    }
}
