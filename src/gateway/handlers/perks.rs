//! Perk and partner handlers for the user-facing app.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};

use super::super::state::AppState;
use super::super::types::{
    ApiError, PartnerPerksResponse, PartnerRedeemRequest, PartnerRedeemResponse, PartnerSummary,
    PartnerWithLogo, PartnersResponse, PerksResponse, require,
};
use crate::models::UserIdentity;
use crate::websocket::WsMessage;

/// Resolve a seed-relative logo path against the serving host, the same
/// way the original static mount did.
fn logo_url(headers: &HeaderMap, logo: &str) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}{}", host, logo)
}

/// List general perks
///
/// GET /api/user/perks
#[utoipa::path(
    get,
    path = "/api/user/perks",
    responses(
        (status = 200, description = "General perk list", body = PerksResponse),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Perks"
)]
pub async fn get_perks(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<UserIdentity>,
) -> Json<PerksResponse> {
    Json(PerksResponse {
        perks: state.catalog.general_perks().to_vec(),
    })
}

/// List partners with their static deals
///
/// GET /api/user/partners
#[utoipa::path(
    get,
    path = "/api/user/partners",
    responses(
        (status = 200, description = "Partner list", body = PartnersResponse),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Perks"
)]
pub async fn get_partners(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<UserIdentity>,
    headers: HeaderMap,
) -> Json<PartnersResponse> {
    let partners = state
        .catalog
        .partners()
        .iter()
        .map(|partner| PartnerWithLogo {
            partner: partner.clone(),
            logo_url: logo_url(&headers, &partner.logo),
        })
        .collect();
    Json(PartnersResponse { partners })
}

/// One partner's deals, static then dashboard-added
///
/// GET /api/user/partners/{slug}/perks
#[utoipa::path(
    get,
    path = "/api/user/partners/{slug}/perks",
    params(("slug" = String, Path, description = "Partner slug, case-insensitive")),
    responses(
        (status = 200, description = "Partner deals", body = PartnerPerksResponse),
        (status = 401, description = "Invalid or missing session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Perks"
)]
pub async fn get_partner_perks(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<UserIdentity>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PartnerPerksResponse>, ApiError> {
    let (partner, perks) = state.catalog.deals_for(&slug)?;
    Ok(Json(PartnerPerksResponse {
        partner: PartnerSummary {
            id: partner.id,
            name: partner.name.clone(),
            slug: partner.slug.clone(),
            logo_url: logo_url(&headers, &partner.logo),
            route: partner.route.clone(),
        },
        perks,
    }))
}

/// Mark a partner deal as redeemed (engagement counter, no balance debit)
///
/// POST /api/user/{partner}/redeem-perks
#[utoipa::path(
    post,
    path = "/api/user/{partner}/redeem-perks",
    params(("partner" = String, Path, description = "Partner slug")),
    request_body = PartnerRedeemRequest,
    responses(
        (status = 200, description = "Redemption counted", body = PartnerRedeemResponse),
        (status = 400, description = "Missing perkId"),
        (status = 401, description = "Invalid or missing session"),
        (status = 404, description = "Partner not found")
    ),
    security(("session_token" = [])),
    tag = "Perks"
)]
pub async fn redeem_partner_perk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
    Path(partner): Path<String>,
    Json(req): Json<PartnerRedeemRequest>,
) -> Result<Json<PartnerRedeemResponse>, ApiError> {
    let perk_id = require(req.perk_id, "perkId is required")?;
    let redemption_count = state.catalog.redeem(&partner, perk_id)?;

    tracing::info!(
        user_id = %user.user_id,
        %partner,
        perk_id,
        redemption_count,
        "partner perk redeemed"
    );

    state.ws_manager.broadcast(&WsMessage::PerkRedeemed {
        partner: partner.clone(),
        perk_id,
        redemption_count,
    });

    Ok(Json(PartnerRedeemResponse {
        success: true,
        partner,
        perk_id,
        redemption_count,
    }))
}
