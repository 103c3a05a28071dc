//! Partner dashboard handlers.
//!
//! Every route here is gated on the dashboard session store; the session
//! identity's display name maps to the partner slug being managed, so a
//! dashboard account only ever sees its own partner's data.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use super::super::state::AppState;
use super::super::types::{
    AddPerkRequest, AddPerkResponse, ApiError, DashDealsResponse, DashPartnerInfo,
    DashPartnerResponse, DashRedeemsResponse, DashStats, DashStatsResponse, DealListing, require,
};
use crate::models::DashboardIdentity;
use crate::websocket::WsMessage;

/// Redemption counts per deal
///
/// GET /api/dash/redeems
#[utoipa::path(
    get,
    path = "/api/dash/redeems",
    responses(
        (status = 200, description = "Redemption counts", body = DashRedeemsResponse),
        (status = 401, description = "Invalid or missing dashboard session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Dashboard"
)]
pub async fn dash_redeems(
    State(state): State<Arc<AppState>>,
    Extension(dash): Extension<DashboardIdentity>,
) -> Result<Json<DashRedeemsResponse>, ApiError> {
    let slug = dash.partner_slug();
    let redemptions = state.catalog.redemption_counts(&slug)?;
    Ok(Json(DashRedeemsResponse {
        success: true,
        partner: slug,
        redemptions,
    }))
}

/// Managed partner info
///
/// GET /api/dash/partner
#[utoipa::path(
    get,
    path = "/api/dash/partner",
    responses(
        (status = 200, description = "Partner info", body = DashPartnerResponse),
        (status = 401, description = "Invalid or missing dashboard session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Dashboard"
)]
pub async fn dash_partner(
    State(state): State<Arc<AppState>>,
    Extension(dash): Extension<DashboardIdentity>,
) -> Result<Json<DashPartnerResponse>, ApiError> {
    let slug = dash.partner_slug();
    let partner = state
        .catalog
        .partner_by_slug(&slug)
        .ok_or(ApiError::NotFound("Partner not found"))?;
    Ok(Json(DashPartnerResponse {
        success: true,
        partner: DashPartnerInfo {
            id: partner.id,
            name: partner.name.clone(),
            slug: partner.slug.clone(),
            logo: partner.logo.clone(),
        },
    }))
}

/// All deals with counters, static then dynamic
///
/// GET /api/dash/deals
#[utoipa::path(
    get,
    path = "/api/dash/deals",
    responses(
        (status = 200, description = "Deal listing", body = DashDealsResponse),
        (status = 401, description = "Invalid or missing dashboard session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Dashboard"
)]
pub async fn dash_deals(
    State(state): State<Arc<AppState>>,
    Extension(dash): Extension<DashboardIdentity>,
) -> Result<Json<DashDealsResponse>, ApiError> {
    let rows = state.catalog.deal_stats(&dash.partner_slug())?;
    Ok(Json(DashDealsResponse {
        success: true,
        deals: rows.into_iter().map(DealListing::from_stats).collect(),
    }))
}

/// Partner aggregates for the stats cards
///
/// GET /api/dash/stats
#[utoipa::path(
    get,
    path = "/api/dash/stats",
    responses(
        (status = 200, description = "Aggregated stats", body = DashStatsResponse),
        (status = 401, description = "Invalid or missing dashboard session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Dashboard"
)]
pub async fn dash_stats(
    State(state): State<Arc<AppState>>,
    Extension(dash): Extension<DashboardIdentity>,
) -> Result<Json<DashStatsResponse>, ApiError> {
    let stats = state.catalog.stats(&dash.partner_slug())?;
    Ok(Json(DashStatsResponse {
        success: true,
        stats: DashStats {
            total_deals: stats.total_deals,
            active_deals: stats.active_deals,
            total_views: stats.total_views,
            total_redemptions: stats.total_redemptions,
        },
    }))
}

/// Add a promotional deal
///
/// POST /api/dash/add-perk
#[utoipa::path(
    post,
    path = "/api/dash/add-perk",
    request_body = AddPerkRequest,
    responses(
        (status = 200, description = "Deal appended", body = AddPerkResponse),
        (status = 400, description = "Missing title or description"),
        (status = 401, description = "Invalid or missing dashboard session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Dashboard"
)]
pub async fn dash_add_perk(
    State(state): State<Arc<AppState>>,
    Extension(dash): Extension<DashboardIdentity>,
    Json(req): Json<AddPerkRequest>,
) -> Result<Json<AddPerkResponse>, ApiError> {
    let slug = dash.partner_slug();
    let title = require(req.title, "title and description are required")?;
    let description = require(req.description, "title and description are required")?;

    let deal = state
        .catalog
        .add_deal(&slug, &title, &description, req.full_description, req.icon)?;

    state.ws_manager.broadcast(&WsMessage::NewDealAdded {
        partner: slug,
        deal: deal.clone(),
    });

    Ok(Json(AddPerkResponse {
        success: true,
        deal,
    }))
}
