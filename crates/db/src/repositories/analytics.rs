//! Budget analytics repository.
//!
//! Loads the inputs of the comparison engine and the overview aggregator
//! inside a single [`Snapshot`], then hands them to the pure services in
//! `tally_core::budget`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use tally_core::budget::{
    BudgetComparison, BudgetError, BudgetsOverviewResponse, ComparisonService, OverviewService,
    OverviewSettings, select_budgets,
};
use tally_shared::AppError;
use tally_shared::types::{BudgetId, UserId};
use tracing::{debug, warn};

use super::budget::{budget_for_user, budgets_for_user};
use super::transaction::transactions_in_window;
use crate::snapshot::Snapshot;

/// Error types for analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Budget missing or owned by someone else.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Read failure. Not retried.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Budget(e @ BudgetError::NotFound(_)) => Self::NotFound(e.to_string()),
            AnalyticsError::Budget(e) => Self::Validation(e.to_string()),
            AnalyticsError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Read-only analytics over budgets and transactions.
#[derive(Debug, Clone, Copy)]
pub struct BudgetAnalyticsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BudgetAnalyticsRepository<'a> {
    /// Creates a new analytics repository.
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Compares a budget against the transactions in its window.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the budget does not exist or is not owned by
    /// `user_id`, or a database error if any read fails.
    pub async fn compare_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<BudgetComparison, AnalyticsError> {
        let snapshot = Snapshot::begin(self.db).await?;

        let budget = budget_for_user(snapshot.connection(), user_id, budget_id)
            .await?
            .ok_or(BudgetError::NotFound(budget_id))?;
        let transactions = transactions_in_window(
            snapshot.connection(),
            user_id,
            &budget.currency,
            budget.start_date,
            budget.end_date,
        )
        .await?;

        snapshot.finish().await?;

        let fetched = transactions.len();
        let comparison = ComparisonService::compare(budget, transactions);

        if let Some(dropped) = &comparison.dropped_untagged {
            warn!(
                user_id = %user_id,
                budget_id = %budget_id,
                transactions = dropped.transaction_count,
                amount = %dropped.total_amount,
                "Untagged spend excluded: budget has no Misc item"
            );
        }
        debug!(
            user_id = %user_id,
            budget_id = %budget_id,
            transactions = fetched,
            items = comparison.items.len(),
            alerts = comparison.alerts.len(),
            total_actual = %comparison.totals.total_actual,
            "Budget compared"
        );

        Ok(comparison)
    }

    /// Builds the dashboard overview of the user's active budgets at `now`.
    ///
    /// Having no budgets, or no active ones, is not an error.
    ///
    /// # Errors
    ///
    /// Returns a database error if any read fails.
    pub async fn overview(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        settings: &OverviewSettings,
    ) -> Result<BudgetsOverviewResponse, AnalyticsError> {
        let snapshot = Snapshot::begin(self.db).await?;

        let budgets = budgets_for_user(snapshot.connection(), user_id, None).await?;
        let selection = select_budgets(&budgets, now);

        let mut transactions = HashMap::with_capacity(selection.budgets.len());
        for budget in &selection.budgets {
            let rows = transactions_in_window(
                snapshot.connection(),
                user_id,
                &budget.currency,
                budget.start_date,
                budget.end_date,
            )
            .await?;
            transactions.insert(budget.id, rows);
        }

        snapshot.finish().await?;

        let overview = OverviewService::build(&budgets, &transactions, now, settings);

        debug!(
            user_id = %user_id,
            budgets = budgets.len(),
            active = overview.overall_health.active_count,
            currency = overview.overall_health.currency.as_deref().unwrap_or("-"),
            over_budget = overview.risk_summary.over_budget,
            nearing_limit = overview.risk_summary.nearing_limit,
            "Budget overview built"
        );

        Ok(overview)
    }
}
