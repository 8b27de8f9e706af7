//! Period preset routes.
//!
//! Resolves "this month", "this year", a given month/year or a custom day
//! range to concrete bounds in the configured timezone. Clients use the
//! result to seed a new budget.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_core::period::{PeriodError, PeriodPreset, PresetKind};
use tally_shared::AppError;

use crate::{ApiError, AppState};

/// Creates the preset routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/budget-presets", get(get_preset))
}

/// Which preset to resolve.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetRequestKind {
    /// The month containing today.
    CurrentMonth,
    /// The year containing today.
    CurrentYear,
    /// `year` and `month`.
    Monthly,
    /// `year`.
    Yearly,
    /// `start` to `end`, inclusive.
    Custom,
}

/// Query parameters for GET /budget-presets.
#[derive(Debug, Deserialize)]
pub struct PresetQuery {
    /// Preset to resolve.
    pub kind: PresetRequestKind,
    /// Calendar year, for `monthly` and `yearly`.
    pub year: Option<i32>,
    /// Month 1-12, for `monthly`.
    pub month: Option<u32>,
    /// First day, for `custom`.
    pub start: Option<NaiveDate>,
    /// Last day, for `custom`.
    pub end: Option<NaiveDate>,
}

/// A resolved preset.
#[derive(Debug, Serialize)]
pub struct PresetResponse {
    /// Resolved kind; the `current-*` requests report `monthly`/`yearly`.
    pub kind: PresetKind,
    /// First instant, local offset.
    pub start: DateTime<FixedOffset>,
    /// Last instant (23:59:59.999 local).
    pub end: DateTime<FixedOffset>,
    /// Display name, e.g. "March 2026".
    pub name: String,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn invalid(err: PeriodError) -> AppError {
    AppError::Validation(err.to_string())
}

fn resolve(query: &PresetQuery, today: NaiveDate) -> Result<PeriodPreset, AppError> {
    match query.kind {
        PresetRequestKind::CurrentMonth => Ok(PeriodPreset::current_month(today)),
        PresetRequestKind::CurrentYear => Ok(PeriodPreset::current_year(today)),
        PresetRequestKind::Monthly => {
            PeriodPreset::monthly(required(query.year, "year")?, required(query.month, "month")?)
                .map_err(invalid)
        }
        PresetRequestKind::Yearly => {
            PeriodPreset::yearly(required(query.year, "year")?).map_err(invalid)
        }
        PresetRequestKind::Custom => {
            PeriodPreset::custom(required(query.start, "start")?, required(query.end, "end")?)
                .map_err(invalid)
        }
    }
}

/// GET /budget-presets
async fn get_preset(
    State(state): State<AppState>,
    query: Result<Query<PresetQuery>, QueryRejection>,
) -> Result<Json<PresetResponse>, ApiError> {
    let Query(query) = query?;
    let tz = state.timezone;
    let today = Utc::now().with_timezone(&tz).date_naive();
    let preset = resolve(&query, today)?;
    let range = preset.range_in(&tz);

    Ok(Json(PresetResponse {
        kind: preset.kind(),
        start: range.start.fixed_offset(),
        end: range.end.fixed_offset(),
        name: preset.name_in(&tz),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use std::sync::Arc;
    use tally_core::budget::OverviewSettings;
    use tower::ServiceExt;

    fn app(timezone: chrono_tz::Tz) -> axum::Router {
        crate::create_router(AppState {
            db: Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            settings: Arc::new(OverviewSettings::default()),
            timezone,
        })
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_monthly_preset_in_configured_timezone() {
        let (status, body) = get(
            app(chrono_tz::America::New_York),
            "/api/v1/budget-presets?kind=monthly&year=2026&month=3",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "monthly");
        assert_eq!(body["name"], "March 2026");
        assert_eq!(body["start"], "2026-03-01T00:00:00-05:00");
        assert_eq!(body["end"], "2026-03-31T23:59:59.999-04:00");
    }

    #[tokio::test]
    async fn test_custom_preset_name() {
        let (status, body) = get(
            app(chrono_tz::UTC),
            "/api/v1/budget-presets?kind=custom&start=2026-01-05&end=2026-02-10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "custom");
        assert_eq!(body["name"], "Jan 5, 2026 - Feb 10, 2026");
    }

    #[tokio::test]
    async fn test_presets_do_not_require_identity() {
        let (status, body) = get(
            app(chrono_tz::UTC),
            "/api/v1/budget-presets?kind=current-year",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "yearly");
    }

    #[rstest]
    #[case("/api/v1/budget-presets?kind=monthly&year=2026&month=13")]
    #[case("/api/v1/budget-presets?kind=monthly&year=2026")]
    #[case("/api/v1/budget-presets?kind=yearly&year=0")]
    #[case("/api/v1/budget-presets?kind=custom&start=2026-02-10&end=2026-01-05")]
    #[case("/api/v1/budget-presets?kind=fortnightly")]
    #[case("/api/v1/budget-presets?kind=custom&start=yesterday&end=2026-01-05")]
    #[tokio::test]
    async fn test_invalid_presets_are_rejected(#[case] uri: &str) {
        let (status, body) = get(app(chrono_tz::UTC), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_current_month_uses_today() {
        let query = PresetQuery {
            kind: PresetRequestKind::CurrentMonth,
            year: None,
            month: None,
            start: None,
            end: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();

        let preset = resolve(&query, today).unwrap();
        assert_eq!(preset.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(preset.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
