//! Login handlers for the two identity surfaces.
//!
//! Missing fields are 400, unknown ids and wrong passwords both collapse
//! into the same 401 so the two cases are indistinguishable to a caller.

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{
    ApiError, DashLoginRequest, LoginResponse, UserLoginRequest, require,
};
use crate::models::{DashboardIdentity, UserIdentity};
use crate::seed;

/// User login
///
/// POST /api/user/login
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = UserLoginRequest,
    responses(
        (status = 200, description = "Session issued"),
        (status = 400, description = "Missing userid or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn user_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserLoginRequest>,
) -> Result<Json<LoginResponse<UserIdentity>>, ApiError> {
    let userid = require(req.userid, "userid and password are required")?;
    let password = require(req.password, "userid and password are required")?;

    let record = seed::USERS
        .get(userid.as_str())
        .ok_or(ApiError::InvalidCredentials)?;
    if record.password != password {
        return Err(ApiError::InvalidCredentials);
    }

    // Account initialization happens here, not in the read paths: the
    // starting balance and the demo history exist before the first fetch.
    state.ledger.ensure_account(&record.user_id);

    let identity = UserIdentity {
        user_id: record.user_id.clone(),
        name: record.name.clone(),
    };
    let cookie = state.user_sessions.issue(identity.clone());
    tracing::info!(
        user_id = %identity.user_id,
        sessions = state.user_sessions.len(),
        "login successful"
    );

    Ok(Json(LoginResponse {
        success: true,
        cookie,
        user: identity,
    }))
}

/// Dashboard login
///
/// POST /api/dash/login
#[utoipa::path(
    post,
    path = "/api/dash/login",
    request_body = DashLoginRequest,
    responses(
        (status = 200, description = "Dashboard session issued"),
        (status = 400, description = "Missing dashid or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn dash_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DashLoginRequest>,
) -> Result<Json<LoginResponse<DashboardIdentity>>, ApiError> {
    let dashid = require(req.dashid, "dashid and password are required")?;
    let password = require(req.password, "dashid and password are required")?;

    let record = seed::DASHBOARD_USERS
        .get(dashid.as_str())
        .ok_or(ApiError::InvalidCredentials)?;
    if record.password != password {
        return Err(ApiError::InvalidCredentials);
    }

    let identity = DashboardIdentity {
        dash_id: record.dash_id.clone(),
        name: record.name.clone(),
    };
    let cookie = state.dashboard_sessions.issue(identity.clone());
    tracing::info!(
        dash_id = %identity.dash_id,
        sessions = state.dashboard_sessions.len(),
        "dashboard login successful"
    );

    Ok(Json(LoginResponse {
        success: true,
        cookie,
        user: identity,
    }))
}
