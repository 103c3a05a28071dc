//! AI commentary handlers.
//!
//! These proxy straight to the upstream text model; no core state is
//! read and no locks are held across the await. As in the source system
//! they are unauthenticated - the client sends the data to analyze.

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiError, RoastRequest, RoastResponse, WellbeingRequest, require};
use crate::ai::WellbeingReport;

/// Generate a spending roast
///
/// POST /api/user/generate-roast
#[utoipa::path(
    post,
    path = "/api/user/generate-roast",
    request_body = RoastRequest,
    responses(
        (status = 200, description = "Roast text", body = RoastResponse),
        (status = 400, description = "Missing inputs"),
        (status = 403, description = "Upstream quota exceeded"),
        (status = 429, description = "Upstream rate limited")
    ),
    tag = "AI"
)]
pub async fn generate_roast(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoastRequest>,
) -> Result<Json<RoastResponse>, ApiError> {
    let balance = require(req.balance, "balance is required")?;
    let monthly_earned = require(req.monthly_earned, "monthlyEarned is required")?;
    let recent_payments = req.recent_payments.unwrap_or_default();

    tracing::info!(%balance, %monthly_earned, payments = recent_payments.len(), "generating roast");
    let roast = state
        .commentary
        .roast(balance, monthly_earned, &recent_payments)
        .await?;

    Ok(Json(RoastResponse { roast }))
}

/// Analyze transactions for wellbeing signals
///
/// POST /api/user/analyze-wellbeing
#[utoipa::path(
    post,
    path = "/api/user/analyze-wellbeing",
    request_body = WellbeingRequest,
    responses(
        (status = 200, description = "Wellbeing report, resources never empty", body = WellbeingReport),
        (status = 403, description = "Upstream quota exceeded"),
        (status = 429, description = "Upstream rate limited")
    ),
    tag = "AI"
)]
pub async fn analyze_wellbeing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WellbeingRequest>,
) -> Result<Json<WellbeingReport>, ApiError> {
    let transactions = req.transactions.unwrap_or_default();
    tracing::info!(count = transactions.len(), "analyzing wellbeing");

    let report = state.commentary.wellbeing(&transactions).await?;
    Ok(Json(report))
}
