//! Settlement webhook handlers.
//!
//! Inbound events from the wallet provider and the companion web app are
//! reconciled against session state here. Every handler validates required
//! fields before mutating anything, is idempotent under duplicate delivery,
//! and treats balance verification and notification delivery as
//! best-effort: neither may block the acknowledgment.

use axum::{Json, extract::State};
use chrono::Utc;
use mintcart_core::{UserId, WalletAddress};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::services::{InlineAction, OutboundMessage, WalletSession};
use crate::state::AppState;

/// Parse a user identifier that may arrive as a JSON number or a numeric
/// string (webhook senders are not consistent about this).
fn parse_user_id(value: &serde_json::Value) -> Option<UserId> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map(UserId::new),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Deliver a notification, logging instead of failing the handler.
async fn notify_best_effort(state: &AppState, user: UserId, message: OutboundMessage) {
    if let Err(err) = state.notifier().send(user, message).await {
        warn!(user = %user, error = %err, "Notification delivery failed");
    }
}

// ============================================================================
// Wallet created
// ============================================================================

/// Payload of `POST /api/webhook/wallet-created`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreatedRequest {
    #[serde(default)]
    pub user_id: serde_json::Value,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub crossmint_user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Handle a wallet-created event: link the wallet to the user's session.
///
/// Missing/invalid fields short-circuit with 400 before any state mutation.
#[instrument(skip(state, request))]
pub async fn wallet_created(
    State(state): State<AppState>,
    Json(request): Json<WalletCreatedRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = parse_user_id(&request.user_id)
        .ok_or_else(|| AppError::BadRequest("userId must be numeric".to_owned()))?;

    let wallet_address = request
        .wallet_address
        .filter(|address| !address.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing walletAddress".to_owned()))?;

    let provider_user_id = request
        .crossmint_user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing crossmintUserId".to_owned()))?;

    let wallet = WalletAddress::new(wallet_address);

    // Re-linking the same wallet must not reset an existing delegation.
    let delegated = state
        .sessions()
        .get(user)
        .is_some_and(|existing| existing.wallet_address == wallet && existing.delegated);

    state.sessions().upsert(
        user,
        WalletSession {
            wallet_address: wallet.clone(),
            provider_user_id,
            email: request.email,
            auth_token: request.auth_token.map(SecretString::from),
            delegated,
            linked_at: Utc::now(),
        },
    );

    // Confirm the write actually landed before acknowledging.
    let stored = state
        .sessions()
        .get(user)
        .filter(|session| session.wallet_address == wallet)
        .ok_or_else(|| {
            AppError::Internal("session store did not persist the wallet update".to_owned())
        })?;

    info!(user = %user, wallet = %stored.wallet_address.masked(), "Wallet linked");

    notify_best_effort(
        &state,
        user,
        OutboundMessage::text(format!(
            "Your wallet {} is ready. Fund it with USDC and you can start shopping!",
            wallet.masked()
        )),
    )
    .await;

    Ok(Json(json!({
        "success": true,
        "userId": user,
        "walletAddress": wallet.masked(),
    })))
}

// ============================================================================
// Payment completed
// ============================================================================

/// Payload of `POST /api/webhook/payment-completed`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletedRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

/// Handle a payment-completed event.
///
/// Balance verification is best-effort: a failed lookup degrades to an
/// unverified-but-successful notification, never to an error response.
#[instrument(skip(state, request))]
pub async fn payment_completed(
    State(state): State<AppState>,
    Json(request): Json<PaymentCompletedRequest>,
) -> Json<serde_json::Value> {
    let user = request.user_id.as_ref().and_then(parse_user_id);

    if let Some(user) = user {
        if let Some(session) = state.sessions().get(user) {
            let message = match state
                .crossmint()
                .fetch_usdc_balance(&session.wallet_address)
                .await
            {
                Ok(balance) => OutboundMessage::text(format!(
                    "Payment completed! Your wallet balance is now {balance} USDC."
                )),
                Err(err) => {
                    warn!(user = %user, error = %err, "Balance verification failed");
                    OutboundMessage::text(
                        "Payment completed! Your balance will update shortly.".to_owned(),
                    )
                }
            };
            notify_best_effort(&state, user, message).await;
        }
    }

    Json(json!({ "success": true }))
}

// ============================================================================
// Transaction approved
// ============================================================================

/// Payload of `POST /api/webhook/transaction-approved`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionApprovedRequest {
    #[serde(default)]
    pub user_id: serde_json::Value,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Handle a transaction-approved event.
#[instrument(skip(state, request))]
pub async fn transaction_approved(
    State(state): State<AppState>,
    Json(request): Json<TransactionApprovedRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = parse_user_id(&request.user_id)
        .ok_or_else(|| AppError::BadRequest("userId must be numeric".to_owned()))?;
    let transaction_id = request
        .transaction_id
        .ok_or_else(|| AppError::BadRequest("missing transactionId".to_owned()))?;
    let order_id = request
        .order_id
        .ok_or_else(|| AppError::BadRequest("missing orderId".to_owned()))?;
    let status = request
        .status
        .ok_or_else(|| AppError::BadRequest("missing status".to_owned()))?;

    if status == "approved" {
        // Best-effort balance re-verification, same fallback rule as
        // payment-completed.
        let balance_line = match state.sessions().get(user) {
            Some(session) => match state
                .crossmint()
                .fetch_usdc_balance(&session.wallet_address)
                .await
            {
                Ok(balance) => format!("\nRemaining balance: {balance} USDC"),
                Err(err) => {
                    warn!(user = %user, error = %err, "Balance verification failed");
                    String::new()
                }
            },
            None => String::new(),
        };

        notify_best_effort(
            &state,
            user,
            OutboundMessage::text(format!(
                "Your order is confirmed!\nOrder: {order_id}\nTransaction: {transaction_id}{balance_line}"
            ))
            .with_actions(vec![
                InlineAction {
                    label: "Track order".to_owned(),
                    action: format!("/status {order_id}"),
                },
                InlineAction {
                    label: "Buy something else".to_owned(),
                    action: "/buy".to_owned(),
                },
            ]),
        )
        .await;
    } else {
        notify_best_effort(
            &state,
            user,
            OutboundMessage::text(format!(
                "Your transaction {transaction_id} was not approved (status: {status}). No funds were moved."
            )),
        )
        .await;
    }

    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Delegation completed
// ============================================================================

/// Payload of `POST /api/webhook/delegation-completed`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationCompletedRequest {
    #[serde(default)]
    pub user_id: serde_json::Value,
    #[serde(default)]
    pub bot_signer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Handle a delegation-completed event.
#[instrument(skip(state, request))]
pub async fn delegation_completed(
    State(state): State<AppState>,
    Json(request): Json<DelegationCompletedRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = parse_user_id(&request.user_id)
        .ok_or_else(|| AppError::BadRequest("userId must be numeric".to_owned()))?;
    let _bot_signer = request
        .bot_signer
        .filter(|signer| !signer.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing botSigner".to_owned()))?;
    let status = request
        .status
        .ok_or_else(|| AppError::BadRequest("missing status".to_owned()))?;

    if status == "success" {
        let updated = state.sessions().set_delegated(user, true);
        if !updated {
            warn!(user = %user, "Delegation completed for a user without a session");
        }
        notify_best_effort(
            &state,
            user,
            OutboundMessage::text(
                "Auto-approval is enabled. Future purchases will complete without a passkey prompt.",
            ),
        )
        .await;
    } else {
        notify_best_effort(
            &state,
            user,
            OutboundMessage::text(format!(
                "Enabling auto-approval failed (status: {status}). You can try again from the wallet page."
            )),
        )
        .await;
    }

    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Logout
// ============================================================================

/// Payload of `POST /api/logout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

/// Clear wallet-auth state and session memory for a user.
#[instrument(skip(state, request))]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = request
        .user_id
        .map(UserId::new)
        .ok_or_else(|| AppError::BadRequest("userId must be a number".to_owned()))?;

    let cleared = state.sessions().clear(user);
    info!(user = %user, cleared, source = ?request.source, "Logout processed");

    Ok(Json(json!({
        "success": true,
        "sessionCleared": cleared,
    })))
}
