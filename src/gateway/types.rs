//! Gateway types: request/response DTOs and the API error taxonomy.
//!
//! Responses keep the exact wire shapes the web client and the partner
//! dashboard already consume (camelCase fields, `success` flags, the
//! `{error}` envelope on failures). Errors are one enum mapped to status
//! codes at the boundary; notably, session failures are a distinct 401,
//! never folded into 404 (insufficient funds, not-found and
//! unauthenticated must all be distinguishable in the UI).

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::ai::{AiError, PaymentLine};
use crate::catalog::{CatalogError, DealStats};
use crate::core_types::DealId;
use crate::ledger::LedgerError;
use crate::models::{Deal, Partner, Perk, Transaction, TxnKind};
use crate::simulation::SimulationError;

// ============================================================================
// API Error Taxonomy
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or missing session")]
    Unauthorized,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Insufficient funds")]
    InsufficientFunds {
        current_balance: Decimal,
        required: Decimal,
    },
    #[error("Test simulation is already running for this user")]
    AlreadyRunning,
    #[error("No test simulation is currently running for this user")]
    NotRunning,
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::InsufficientFunds { .. }
            | ApiError::AlreadyRunning
            | ApiError::NotRunning => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InsufficientFunds {
                current_balance,
                required,
            } => json!({
                "success": false,
                "error": "Insufficient funds",
                "currentBalance": current_balance,
                "required": required,
            }),
            ApiError::AlreadyRunning => json!({
                "error": self.to_string(),
                "isRunning": true,
            }),
            ApiError::NotRunning => json!({
                "error": self.to_string(),
                "isRunning": false,
            }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal error at request boundary");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                current_balance,
                required,
            } => ApiError::InsufficientFunds {
                current_balance,
                required,
            },
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::PartnerNotFound => ApiError::NotFound("Partner not found"),
            CatalogError::MissingDealFields => ApiError::InvalidInput(err.to_string()),
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::AlreadyRunning => ApiError::AlreadyRunning,
            SimulationError::NotRunning => ApiError::NotRunning,
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        let status = match err {
            AiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AiError::QuotaExceeded => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::Upstream {
            status,
            message: err.to_string(),
        }
    }
}

/// Unwrap a required request field or fail with 400 and the exact
/// message the client expects.
pub fn require<T>(value: Option<T>, message: &'static str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::InvalidInput(message.to_string()))
}

// ============================================================================
// Auth DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserLoginRequest {
    #[schema(example = "user")]
    pub userid: Option<String>,
    #[schema(example = "password")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DashLoginRequest {
    #[schema(example = "admin")]
    pub dashid: Option<String>,
    pub password: Option<String>,
}

/// Login response; `cookie` is the opaque session token the client sends
/// back on every protected call.
#[derive(Debug, Serialize)]
pub struct LoginResponse<I: Serialize> {
    pub success: bool,
    pub cookie: String,
    pub user: I,
}

// ============================================================================
// Wallet / Ledger DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub success: bool,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TxnKind>,
    pub date: Option<DateTime<Utc>>,
    pub merchant: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: Transaction,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPerkRequest {
    pub perk_id: Option<u32>,
    pub perk_name: Option<String>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPerkResponse {
    pub success: bool,
    pub perk_name: String,
    pub cost: Decimal,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
}

// ============================================================================
// Catalog DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct PerksResponse {
    pub perks: Vec<Perk>,
}

/// Partner as listed to the app, with the logo resolved to a full URL
/// against the serving host.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerWithLogo {
    #[serde(flatten)]
    pub partner: Partner,
    pub logo_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartnersResponse {
    pub partners: Vec<PartnerWithLogo>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub logo_url: String,
    pub route: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartnerPerksResponse {
    pub partner: PartnerSummary,
    pub perks: Vec<Deal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRedeemRequest {
    pub perk_id: Option<DealId>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRedeemResponse {
    pub success: bool,
    pub partner: String,
    pub perk_id: DealId,
    pub redemption_count: u64,
}

// ============================================================================
// Dashboard DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DashRedeemsResponse {
    pub success: bool,
    pub partner: String,
    pub redemptions: HashMap<DealId, u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashPartnerInfo {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub logo: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashPartnerResponse {
    pub success: bool,
    pub partner: DashPartnerInfo,
}

/// Deal row on the dashboard. Field naming follows the existing
/// dashboard client verbatim, mixed casing included.
#[derive(Debug, Serialize, ToSchema)]
pub struct DealListing {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "fullDescription")]
    pub full_description: String,
    pub icon: String,
    pub discount_percentage: u32,
    pub discount_amount: Option<Decimal>,
    pub status: String,
    pub valid_from: String,
    pub valid_to: Option<String>,
    pub category: Option<String>,
    pub views: u64,
    pub redemptions: u64,
}

impl DealListing {
    pub fn from_stats(stats: DealStats) -> Self {
        Self {
            id: stats.deal.id.to_string(),
            title: stats.deal.title,
            description: stats.deal.description,
            full_description: stats.deal.full_description,
            icon: stats.deal.icon,
            discount_percentage: 0,
            discount_amount: None,
            status: "active".to_string(),
            valid_from: Utc::now().format("%Y-%m-%d").to_string(),
            valid_to: None,
            category: None,
            views: stats.views,
            redemptions: stats.redemptions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashDealsResponse {
    pub success: bool,
    pub deals: Vec<DealListing>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashStats {
    pub total_deals: usize,
    pub active_deals: usize,
    pub total_views: u64,
    pub total_redemptions: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashStatsResponse {
    pub success: bool,
    pub stats: DashStats,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPerkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddPerkResponse {
    pub success: bool,
    pub deal: Deal,
}

// ============================================================================
// Simulation DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTestResponse {
    pub success: bool,
    pub message: String,
    pub duration: String,
    pub transactions_per_month: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndTestResponse {
    pub success: bool,
    pub message: String,
    pub is_running: bool,
}

// ============================================================================
// AI DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoastRequest {
    pub balance: Option<Decimal>,
    pub monthly_earned: Option<Decimal>,
    pub recent_payments: Option<Vec<PaymentLine>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoastResponse {
    pub roast: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WellbeingRequest {
    pub transactions: Option<Vec<Transaction>>,
}

// ============================================================================
// Misc
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_body_shape() {
        let err = ApiError::InsufficientFunds {
            current_balance: Decimal::new(6175, 2),
            required: Decimal::from(70),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // The body carries current/required so the UI can show both
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_session_failure_is_401_not_404() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("Partner not found").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_simulation_errors_are_400() {
        assert_eq!(ApiError::AlreadyRunning.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotRunning.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ai_error_statuses_pass_through() {
        let err: ApiError = AiError::RateLimited.into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        let err: ApiError = AiError::QuotaExceeded.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let err: ApiError = AiError::MissingApiKey.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_deal_listing_wire_names() {
        let listing = DealListing::from_stats(DealStats {
            deal: Deal {
                id: 4,
                title: "T".to_string(),
                description: "D".to_string(),
                full_description: "F".to_string(),
                icon: "gift".to_string(),
            },
            views: 7,
            redemptions: 3,
        });
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["id"], "4"); // stringified for the dashboard grid
        assert_eq!(json["fullDescription"], "F");
        assert_eq!(json["discount_percentage"], 0);
        assert_eq!(json["status"], "active");
        assert_eq!(json["views"], 7);
    }
}
