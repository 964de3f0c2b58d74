use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// Readiness of the service and its database
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is ready", body = HealthStatus),
        (status = 500, description = "Database is not reachable", body = HealthStatus)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    match stations_db::status_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Database status check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthStatus {
                    status: "db not ready".to_string(),
                }),
            )
        }
    }
}
