//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::identity_middleware};

pub mod budgets;
pub mod health;
pub mod presets;

/// Creates the API router. Budget routes sit behind the identity middleware.
pub fn api_routes() -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(budgets::routes())
        .layer(middleware::from_fn(identity_middleware));

    Router::new()
        .merge(health::routes())
        .merge(presets::routes())
        .merge(protected_routes)
}
