//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the budget comparison and overview
//! - Caller identity middleware
//! - JSON error rendering

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::budget::OverviewSettings;
use tally_shared::{AnalyticsConfig, AppError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Overview thresholds.
    pub settings: Arc<OverviewSettings>,
    /// Timezone treated as local time for period presets.
    pub timezone: Tz,
}

impl AppState {
    /// Builds state from a connection and the analytics configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if `analytics.timezone` is not a
    /// known IANA name.
    pub fn new(db: DatabaseConnection, analytics: &AnalyticsConfig) -> Result<Self, AppError> {
        let timezone: Tz = analytics.timezone.parse().map_err(|e| {
            AppError::Configuration(format!(
                "Invalid analytics.timezone {:?}: {e}",
                analytics.timezone
            ))
        })?;

        Ok(Self {
            db: Arc::new(db),
            settings: Arc::new(OverviewSettings::from(analytics)),
            timezone,
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[test]
    fn test_state_parses_timezone() {
        let analytics = AnalyticsConfig {
            timezone: "Europe/Berlin".to_string(),
            ..AnalyticsConfig::default()
        };

        let state = AppState::new(mock_db(), &analytics).unwrap();
        assert_eq!(state.timezone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_unknown_timezone_is_configuration_error() {
        let analytics = AnalyticsConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..AnalyticsConfig::default()
        };

        let Err(err) = AppState::new(mock_db(), &analytics) else {
            panic!("unknown timezone accepted");
        };
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }
}
