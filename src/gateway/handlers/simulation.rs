//! Simulation control handlers.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiError, EndTestResponse, StartTestResponse};
use crate::models::UserIdentity;
use crate::simulation::{MONTHS_IN_YEAR, TRANSACTIONS_PER_MONTH};

/// Start the 12-month spending simulation
///
/// GET /api/user/start-test
#[utoipa::path(
    get,
    path = "/api/user/start-test",
    responses(
        (status = 200, description = "Simulation started", body = StartTestResponse),
        (status = 400, description = "Simulation already running"),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Simulation"
)]
pub async fn start_test(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
) -> Result<Json<StartTestResponse>, ApiError> {
    state.simulation.start(&user.user_id)?;

    let seconds = state.simulation.tick().as_secs_f64() * MONTHS_IN_YEAR as f64;
    Ok(Json(StartTestResponse {
        success: true,
        message: "Test simulation started".to_string(),
        duration: format!("{} seconds", seconds.round() as u64),
        transactions_per_month: TRANSACTIONS_PER_MONTH,
    }))
}

/// Stop a running simulation
///
/// GET /api/user/end-test
#[utoipa::path(
    get,
    path = "/api/user/end-test",
    responses(
        (status = 200, description = "Simulation stopped", body = EndTestResponse),
        (status = 400, description = "No simulation running"),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Simulation"
)]
pub async fn end_test(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
) -> Result<Json<EndTestResponse>, ApiError> {
    state.simulation.stop(&user.user_id)?;

    Ok(Json(EndTestResponse {
        success: true,
        message: "Test simulation stopped successfully".to_string(),
        is_running: false,
    }))
}
