//! Wallet handlers: balance, transaction log, payments, generic perk
//! redemption.

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::{
    ApiError, BalanceResponse, CreateTransactionRequest, RedeemPerkRequest, RedeemPerkResponse,
    TransactionResponse, WalletResponse, require,
};
use crate::models::UserIdentity;

/// Get reward balance
///
/// GET /api/user/balance
#[utoipa::path(
    get,
    path = "/api/user/balance",
    responses(
        (status = 200, description = "Current reward balance", body = BalanceResponse),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
) -> Json<BalanceResponse> {
    Json(BalanceResponse {
        success: true,
        balance: state.ledger.balance(&user.user_id),
    })
}

/// Get all transactions, newest first
///
/// GET /api/user/wallet
#[utoipa::path(
    get,
    path = "/api/user/wallet",
    responses(
        (status = 200, description = "Transaction log", body = WalletResponse),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Wallet"
)]
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
) -> Json<WalletResponse> {
    let transactions = state.ledger.transactions(&user.user_id);
    tracing::debug!(user_id = %user.user_id, count = transactions.len(), "wallet requested");
    Json(WalletResponse {
        success: true,
        transactions,
    })
}

/// Record a payment and earn 5% credits
///
/// POST /api/user/transactions
#[utoipa::path(
    post,
    path = "/api/user/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Missing or non-positive amount, missing description"),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Wallet"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let amount = require(req.amount, "Transaction must include amount and description")?;
    let description = require(
        req.description,
        "Transaction must include amount and description",
    )?;

    let transaction = state.ledger.record(
        &user.user_id,
        amount,
        &description,
        req.kind,
        req.date,
        req.merchant,
    )?;

    tracing::info!(
        user_id = %user.user_id,
        transaction_id = %transaction.id,
        %amount,
        credits = %transaction.credits,
        "transaction created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            success: true,
            transaction,
        }),
    ))
}

/// Redeem a generic perk against the balance
///
/// POST /api/user/redeem-perk
#[utoipa::path(
    post,
    path = "/api/user/redeem-perk",
    request_body = RedeemPerkRequest,
    responses(
        (status = 200, description = "Perk redeemed", body = RedeemPerkResponse),
        (status = 400, description = "Missing fields or insufficient funds"),
        (status = 401, description = "Invalid or missing session")
    ),
    security(("session_token" = [])),
    tag = "Wallet"
)]
pub async fn redeem_perk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserIdentity>,
    Json(req): Json<RedeemPerkRequest>,
) -> Result<Json<RedeemPerkResponse>, ApiError> {
    let perk_id = require(req.perk_id, "perkId, perkName, and cost are required")?;
    let perk_name = require(req.perk_name, "perkId, perkName, and cost are required")?;
    let cost = require(req.cost, "perkId, perkName, and cost are required")?;

    let (previous_balance, new_balance) = state.ledger.redeem(&user.user_id, cost)?;

    tracing::info!(
        user_id = %user.user_id,
        perk_id,
        %perk_name,
        %cost,
        %previous_balance,
        %new_balance,
        "perk redeemed"
    );

    Ok(Json(RedeemPerkResponse {
        success: true,
        perk_name,
        cost,
        previous_balance,
        new_balance,
    }))
}
