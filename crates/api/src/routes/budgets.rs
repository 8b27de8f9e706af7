//! Budget analytics routes.
//!
//! Both endpoints are read-only and scoped to the caller from
//! [`AuthUser`].

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    routing::get,
};
use chrono::Utc;
use tally_core::budget::{BudgetComparison, BudgetsOverviewResponse};
use tally_db::BudgetAnalyticsRepository;
use tally_shared::types::BudgetId;

use crate::{ApiError, AppState, middleware::AuthUser};

/// Creates the budget routes (requires the identity middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets/overview", get(get_overview))
        .route("/budgets/{budget_id}/comparison", get(get_comparison))
}

/// GET /budgets/overview
async fn get_overview(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BudgetsOverviewResponse>, ApiError> {
    let overview = BudgetAnalyticsRepository::new(&state.db)
        .overview(user.user_id(), Utc::now(), &state.settings)
        .await?;

    Ok(Json(overview))
}

/// GET /budgets/{budget_id}/comparison
async fn get_comparison(
    State(state): State<AppState>,
    user: AuthUser,
    budget_id: Result<Path<BudgetId>, PathRejection>,
) -> Result<Json<BudgetComparison>, ApiError> {
    let Path(budget_id) = budget_id?;
    let comparison = BudgetAnalyticsRepository::new(&state.db)
        .compare_budget(user.user_id(), budget_id)
        .await?;

    Ok(Json(comparison))
}
