//! Health check endpoint handlers.
//!
//! Liveness never touches the store; readiness counts users through the
//! service so it exercises the same path as real requests.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{HealthResponse, HealthStatus, ReadinessResponse};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Liveness probe
/// - `GET /health/ready` - Readiness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: crate::pkg_version().to_string(),
        timestamp: jiff::Timestamp::now().to_string(),
    })
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "User store reachable", body = ReadinessResponse),
        (status = 503, description = "User store unavailable", body = ReadinessResponse)
    )
)]
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let start = Instant::now();
    let result = state.services.users.count_users().await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: HealthStatus::Healthy,
                response_time_ms,
                message: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: HealthStatus::Unhealthy,
                    response_time_ms,
                    message: Some("User store unavailable".to_string()),
                }),
            )
        }
    }
}
