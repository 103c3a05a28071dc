//! Health check handler

use axum::Json;

use super::super::types::HealthResponse;

/// Health check endpoint
///
/// All state is in-process, so being able to answer is the health check.
///
/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service healthy", body = HealthResponse)),
    tag = "System"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
