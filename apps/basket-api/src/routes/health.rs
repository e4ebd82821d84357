//! Health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use basket_db::migrations::migration_status;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub database: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

/// `200` when the database answers, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = state.db.health_check().await;
    let (total, applied) = migration_status(state.db.pool()).await.unwrap_or((0, 0));

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(HealthReport {
            status: label,
            database,
            migrations_applied: applied,
            migrations_total: total,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;

    #[tokio::test]
    async fn test_health_reports_database() {
        let state = test_state().await;

        let (status, Json(report)) = health(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(report.database);
        assert_eq!(report.migrations_applied, report.migrations_total);

        state.db.close().await;
        let (status, Json(report)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!report.database);
    }
}
