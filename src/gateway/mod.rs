//! HTTP gateway: routers, session middleware, server bootstrap.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::websocket::ws_handler;
use state::AppState;
use types::ApiError;

/// Cap on buffered request bodies while looking for a body token.
const MAX_BUFFERED_BODY: usize = 256 * 1024;

/// Pull the session token out of a request.
///
/// Accepted locations, in precedence order (first non-empty wins):
/// bearer Authorization header, `x-auth-cookie` header, `cookie` body
/// field, `cookie` query parameter. When the header locations miss, the
/// body is buffered and re-attached so the handler still sees it intact.
async fn extract_session_token(
    request: Request<Body>,
) -> Result<(Request<Body>, Option<String>), ApiError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let custom = request
        .headers()
        .get("x-auth-cookie")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    if let Some(token) = bearer.or(custom) {
        return Ok((request, Some(token)));
    }

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BUFFERED_BODY)
        .await
        .map_err(|err| ApiError::InvalidInput(format!("failed to read request body: {err}")))?;

    let body_token = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|value| {
            value
                .get("cookie")
                .and_then(|cookie| cookie.as_str())
                .map(str::to_string)
        })
        .filter(|value| !value.trim().is_empty());

    // Tokens are plain hex, so a raw key=value scan over the query is
    // enough; no percent-decoding needed.
    let query_token = parts
        .uri
        .query()
        .and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("cookie="))
                .map(str::to_string)
        })
        .filter(|value| !value.is_empty());

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok((request, body_token.or(query_token)))
}

/// Axum middleware gating the user surface on a valid user session.
///
/// Missing and unknown tokens are both a 401 with a distinct error body;
/// 404 stays reserved for resources that actually don't exist.
async fn user_session_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut request, token) = extract_session_token(request).await?;
    let identity = token
        .and_then(|token| state.user_sessions.resolve(&token))
        .ok_or(ApiError::Unauthorized)?;

    tracing::debug!(user_id = %identity.user_id, path = %request.uri().path(), "session resolved");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Same gate for the partner dashboard surface, against its own store.
async fn dashboard_session_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut request, token) = extract_session_token(request).await?;
    let identity = token
        .and_then(|token| state.dashboard_sessions.resolve(&token))
        .ok_or(ApiError::Unauthorized)?;

    tracing::debug!(dash_id = %identity.dash_id, path = %request.uri().path(), "dashboard session resolved");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // User surface: open login + AI proxies, everything else session-gated
    // ==========================================================================
    let user_public = Router::new()
        .route("/login", post(handlers::user_login))
        .route("/generate-roast", post(handlers::generate_roast))
        .route("/analyze-wellbeing", post(handlers::analyze_wellbeing));

    let user_protected = Router::new()
        .route("/balance", get(handlers::get_balance))
        .route("/wallet", get(handlers::get_wallet))
        .route("/transactions", post(handlers::create_transaction))
        .route("/perks", get(handlers::get_perks))
        .route("/partners", get(handlers::get_partners))
        .route("/partners/{slug}/perks", get(handlers::get_partner_perks))
        .route("/redeem-perk", post(handlers::redeem_perk))
        .route("/{partner}/redeem-perks", post(handlers::redeem_partner_perk))
        .route("/start-test", get(handlers::start_test))
        .route("/end-test", get(handlers::end_test))
        .layer(from_fn_with_state(state.clone(), user_session_middleware));

    // ==========================================================================
    // Dashboard surface
    // ==========================================================================
    let dash_public = Router::new().route("/login", post(handlers::dash_login));

    let dash_protected = Router::new()
        .route("/redeems", get(handlers::dash_redeems))
        .route("/partner", get(handlers::dash_partner))
        .route("/deals", get(handlers::dash_deals))
        .route("/stats", get(handlers::dash_stats))
        .route("/add-perk", post(handlers::dash_add_perk))
        .layer(from_fn_with_state(
            state.clone(),
            dashboard_session_middleware,
        ));

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/api/health", get(handlers::health_check))
        // API Routes
        .nest("/api/user", user_public.merge(user_protected))
        .nest("/api/dash", dash_public.merge(dash_protected))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server
pub async fn run_server(state: Arc<AppState>, config: &AppConfig) {
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, err);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                config.gateway.port, config.gateway.port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📡 WebSocket endpoint: ws://{}/ws", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", err);
        std::process::exit(1);
    }
}
