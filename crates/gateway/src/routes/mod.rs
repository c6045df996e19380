//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check
//!
//! # Purchase flow
//! POST /api/purchase                        - Resolve, order, and sign in one call
//! GET  /api/transaction/{wallet}/{id}/approval - Fetch pending-approval challenge
//! POST /api/transaction/{wallet}/{id}/approval - Submit completed approval
//!
//! # Session
//! GET  /api/user/{user_id}/wallet           - Wallet details for a user
//! POST /api/logout                          - Clear wallet-auth state
//!
//! # Settlement webhooks (called by the wallet provider / web app)
//! POST /api/webhook/wallet-created          - Wallet linked to a user
//! POST /api/webhook/payment-completed       - Payment settled
//! POST /api/webhook/transaction-approved    - Transaction approval finished
//! POST /api/webhook/delegation-completed    - Bot signer delegation finished
//! ```

pub mod purchase;
pub mod user;
pub mod webhooks;

use axum::{
    Json, Router,
    extract::OriginalUri,
    http::{Method, StatusCode},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/wallet-created", post(webhooks::wallet_created))
        .route("/payment-completed", post(webhooks::payment_completed))
        .route(
            "/transaction-approved",
            post(webhooks::transaction_approved),
        )
        .route(
            "/delegation-completed",
            post(webhooks::delegation_completed),
        )
}

/// Create the purchase/approval routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(purchase::purchase))
        .route(
            "/transaction/{wallet}/{transaction_id}/approval",
            get(purchase::fetch_approval).post(purchase::submit_approval),
        )
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhook", webhook_routes())
        .nest("/api", purchase_routes())
        .route("/api/logout", post(webhooks::logout))
        .route("/api/user/{user_id}/wallet", get(user::wallet))
        .fallback(not_found)
}

/// Liveness health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// JSON 404 for unmatched routes.
async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}
