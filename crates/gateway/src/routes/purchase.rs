//! Purchase and approval endpoints.
//!
//! `POST /api/purchase` runs the whole pipeline in one call: session lookup,
//! order build, locator-fallback submission, then transaction signing. The
//! response always names a terminal purchase state; signing failures are
//! reported in the body, not as HTTP errors, because the buyer's flow
//! continues either way.

use axum::{
    Json,
    extract::{Path, State},
};
use mintcart_core::{ShippingAddress, UserId, WalletAddress};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::crossmint::{ApprovalSignature, AuthenticatorMetadata};
use crate::error::{AppError, Result};
use crate::services::locator;
use crate::services::{ApprovalState, ApprovalSubmission, OrderBuilder, OrderOutcome};
use crate::state::AppState;

/// Payload of `POST /api/purchase`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub user_id: i64,
    pub product_url: String,
    #[serde(default)]
    pub email: Option<String>,
    pub shipping_address: ShippingAddress,
}

/// Execute a purchase end to end: resolve the product, create the order,
/// and hand the payment transaction to the wallet for signing.
#[instrument(skip(state, request), fields(user_id = request.user_id))]
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<serde_json::Value>> {
    let user = UserId::new(request.user_id);

    let session = state
        .sessions()
        .get(user)
        .ok_or_else(|| AppError::NotFound("no wallet linked for this user".to_owned()))?;

    let email = request
        .email
        .or(session.email)
        .ok_or_else(|| AppError::BadRequest("an email address is required".to_owned()))?;

    if !locator::is_valid_product_url(&request.product_url) {
        return Err(AppError::BadRequest(
            "productUrl must be an Amazon product link".to_owned(),
        ));
    }

    let prepared = OrderBuilder::build(
        &request.product_url,
        &email,
        &session.wallet_address,
        &request.shipping_address,
    )?;

    // Advisory capability probe. A definitive "not purchasable" saves the
    // whole submission round; a probe failure never blocks the attempt.
    if let Some(item) = prepared.request.line_items.first() {
        match state
            .crossmint()
            .check_product_support(&item.product_locator)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Ok(Json(json!({
                    "status": "unsupported",
                    "orderId": null,
                })));
            }
            Err(err) => warn!(error = %err, "Product support probe failed"),
        }
    }

    let outcome = state.submission().submit(&prepared).await?;

    let response = match outcome {
        OrderOutcome::Succeeded {
            order_id,
            serialized_transaction,
        } => {
            let chain = OrderBuilder::select_chain(&session.wallet_address);
            let signing = state
                .signing()
                .sign(&session.wallet_address, &serialized_transaction, chain)
                .await;

            if !signing.success {
                warn!(order_id, "Signing failed after order creation");
                json!({
                    "status": "signing-failed",
                    "orderId": order_id,
                    "error": signing.error,
                })
            } else if signing.is_awaiting_approval() {
                // Surface the passkey challenge inline when we can fetch it,
                // but an awaiting-approval order stands without it.
                let pending = match signing.transaction_id.as_deref() {
                    Some(transaction_id) => {
                        match state
                            .approvals()
                            .fetch_pending_approval(&session.wallet_address, transaction_id)
                            .await
                        {
                            Ok(ApprovalState::Pending(pending)) => Some(pending),
                            Ok(ApprovalState::NotAwaitingApproval { .. }) => None,
                            Err(err) => {
                                warn!(error = %err, "Could not fetch pending approval");
                                None
                            }
                        }
                    }
                    None => None,
                };

                json!({
                    "status": "awaiting-approval",
                    "orderId": order_id,
                    "transactionId": signing.transaction_id,
                    "pendingApproval": pending.map(|p| json!({
                        "signer": p.signer,
                        "message": p.message,
                    })),
                })
            } else {
                info!(order_id, "Purchase submitted");
                json!({
                    "status": "submitted",
                    "orderId": order_id,
                    "transactionId": signing.transaction_id,
                    "transactionStatus": signing.status,
                })
            }
        }
        OrderOutcome::InsufficientFunds { order_id } => json!({
            "status": "insufficient-funds",
            "orderId": order_id,
        }),
        OrderOutcome::AddressRequired { order_id } => json!({
            "status": "address-required",
            "orderId": order_id,
        }),
        OrderOutcome::Unsupported { order_id } => json!({
            "status": "unsupported",
            "orderId": order_id,
        }),
    };

    Ok(Json(response))
}

/// Fetch the pending passkey challenge for a transaction.
#[instrument(skip(state))]
pub async fn fetch_approval(
    State(state): State<AppState>,
    Path((wallet, transaction_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let wallet = WalletAddress::new(wallet);

    let approval_state = state
        .approvals()
        .fetch_pending_approval(&wallet, &transaction_id)
        .await?;

    let body = match approval_state {
        ApprovalState::Pending(pending) => json!({
            "awaitingApproval": true,
            "transactionId": pending.transaction_id,
            "signer": pending.signer,
            "message": pending.message,
        }),
        ApprovalState::NotAwaitingApproval { status } => json!({
            "awaitingApproval": false,
            "status": status,
        }),
    };

    Ok(Json(body))
}

/// Payload of `POST /api/transaction/{wallet}/{transaction_id}/approval`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApprovalBody {
    pub signer: String,
    pub signature: ApprovalSignature,
    pub metadata: AuthenticatorMetadata,
}

/// Relay a completed passkey approval to the wallet provider.
#[instrument(skip(state, body))]
pub async fn submit_approval(
    State(state): State<AppState>,
    Path((wallet, transaction_id)): Path<(String, String)>,
    Json(body): Json<SubmitApprovalBody>,
) -> Json<serde_json::Value> {
    let wallet = WalletAddress::new(wallet);

    let outcome = state
        .approvals()
        .submit_approval(
            &wallet,
            &transaction_id,
            ApprovalSubmission {
                signer: body.signer,
                signature_r: body.signature.r,
                signature_s: body.signature.s,
                metadata: body.metadata,
            },
        )
        .await;

    Json(json!({
        "success": outcome.success,
        "message": outcome.message,
    }))
}
