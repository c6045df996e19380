//! Transaction signing and passkey-approval relay.
//!
//! Signing failures are values, not propagated errors: callers sit inside a
//! conversation flow that must continue regardless of outcome, so both
//! [`SigningCoordinator::sign`] and [`ApprovalRelay::submit_approval`]
//! return structured results with a human-readable reason instead of
//! bubbling transport errors.

use mintcart_core::{Chain, WalletAddress};
use tracing::{info, instrument, warn};

use crate::crossmint::{
    ApprovalEntry, ApprovalSignature, AuthenticatorMetadata, CrossmintClient, CrossmintError,
    SubmitApprovalRequest,
};

/// Transaction status requiring an out-of-band cryptographic approval.
const STATUS_AWAITING_APPROVAL: &str = "awaiting-approval";

/// Result of submitting a transaction for signing.
#[derive(Debug, Clone)]
pub struct SigningResult {
    /// Whether the provider accepted the submission.
    pub success: bool,
    /// Provider-assigned transaction identifier.
    pub transaction_id: Option<String>,
    /// Embedded transaction status - may be terminal ("confirmed"/"failed")
    /// or intermediate ("awaiting-approval").
    pub status: Option<String>,
    /// Failure reason when `success` is false.
    pub error: Option<String>,
    /// Raw provider payload for diagnostics.
    pub raw: Option<serde_json::Value>,
}

impl SigningResult {
    /// Whether the transaction now waits for an out-of-band approval.
    #[must_use]
    pub fn is_awaiting_approval(&self) -> bool {
        self.success && self.status.as_deref() == Some(STATUS_AWAITING_APPROVAL)
    }

    fn failure(reason: String) -> Self {
        Self {
            success: false,
            transaction_id: None,
            status: None,
            error: Some(reason),
            raw: None,
        }
    }
}

/// A pending approval extracted from an awaiting-approval transaction.
///
/// Exists only between signing submission and approval submission, and is
/// consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingApproval {
    pub transaction_id: String,
    /// The challenge message the signer must sign.
    pub message: String,
    /// Locator of the signer expected to produce the approval.
    pub signer: String,
}

/// Approval state of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalState {
    /// The first pending approval, ready for the passkey ceremony.
    Pending(PendingApproval),
    /// Not awaiting approval - informational, not an error (the transaction
    /// may already be approved, confirmed, or failed).
    NotAwaitingApproval { status: String },
}

/// A caller-supplied completed approval.
#[derive(Debug, Clone)]
pub struct ApprovalSubmission {
    pub signer: String,
    pub signature_r: String,
    pub signature_s: String,
    pub metadata: AuthenticatorMetadata,
}

/// Outcome of submitting an approval.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// Submits serialized transactions to the wallet subsystem for signing.
#[derive(Debug, Clone)]
pub struct SigningCoordinator {
    client: CrossmintClient,
}

impl SigningCoordinator {
    /// Create a new signing coordinator.
    #[must_use]
    pub const fn new(client: CrossmintClient) -> Self {
        Self { client }
    }

    /// Submit a serialized transaction for signing. Exactly one submission,
    /// no retry.
    ///
    /// Never returns an error: HTTP 200/201 is request-accepted (the caller
    /// must still inspect `status`); anything else becomes a structured
    /// failure value.
    #[instrument(skip(self, serialized_transaction), fields(wallet = %wallet.masked()))]
    pub async fn sign(
        &self,
        wallet: &WalletAddress,
        serialized_transaction: &str,
        chain: Chain,
    ) -> SigningResult {
        match self
            .client
            .submit_transaction(wallet, serialized_transaction, chain)
            .await
        {
            Ok(submitted) => {
                info!(
                    transaction_id = ?submitted.id,
                    status = ?submitted.status,
                    "Transaction submitted for signing"
                );
                SigningResult {
                    success: true,
                    transaction_id: submitted.id,
                    status: submitted.status,
                    error: None,
                    raw: Some(submitted.raw),
                }
            }
            Err(CrossmintError::Api { status, message }) => {
                warn!(status, %message, "Transaction submission rejected");
                SigningResult::failure(format!(
                    "wallet service rejected the transaction ({status}): {message}"
                ))
            }
            Err(err) => {
                warn!(error = %err, "Transaction submission failed");
                SigningResult::failure(format!("could not reach the wallet service: {err}"))
            }
        }
    }
}

/// Fetches pending-approval details and relays completed approvals.
#[derive(Debug, Clone)]
pub struct ApprovalRelay {
    client: CrossmintClient,
}

impl ApprovalRelay {
    /// Create a new approval relay.
    #[must_use]
    pub const fn new(client: CrossmintClient) -> Self {
        Self { client }
    }

    /// Fetch the pending approval for a transaction, if any.
    ///
    /// Returns [`ApprovalState::Pending`] with the FIRST entry of the
    /// pending list only when the transaction status is exactly
    /// `awaiting-approval` and the list is non-empty; any other status is
    /// reported as informational, never as an error.
    ///
    /// # Errors
    ///
    /// Returns error only when the transaction cannot be fetched or its
    /// shape is invalid.
    #[instrument(skip(self), fields(wallet = %wallet.masked()))]
    pub async fn fetch_pending_approval(
        &self,
        wallet: &WalletAddress,
        transaction_id: &str,
    ) -> Result<ApprovalState, CrossmintError> {
        let transaction = self.client.get_transaction(wallet, transaction_id).await?;

        if transaction.status == STATUS_AWAITING_APPROVAL {
            let first_pending = transaction
                .approvals
                .as_ref()
                .and_then(|approvals| approvals.pending.first());

            if let Some(entry) = first_pending {
                return Ok(ApprovalState::Pending(PendingApproval {
                    transaction_id: transaction.id,
                    message: entry.message.clone(),
                    signer: entry.signer.clone(),
                }));
            }
        }

        Ok(ApprovalState::NotAwaitingApproval {
            status: transaction.status,
        })
    }

    /// Submit a completed approval. Success is solely HTTP 201; any other
    /// status or network failure becomes a structured failure value.
    #[instrument(skip(self, approval), fields(wallet = %wallet.masked()))]
    pub async fn submit_approval(
        &self,
        wallet: &WalletAddress,
        transaction_id: &str,
        approval: ApprovalSubmission,
    ) -> ApprovalOutcome {
        let request = SubmitApprovalRequest {
            approvals: vec![ApprovalEntry {
                signer: approval.signer,
                signature: ApprovalSignature {
                    r: approval.signature_r,
                    s: approval.signature_s,
                },
                metadata: approval.metadata,
            }],
        };

        match self
            .client
            .submit_approval(wallet, transaction_id, &request)
            .await
        {
            Ok(()) => {
                info!(transaction_id, "Approval accepted");
                ApprovalOutcome {
                    success: true,
                    message: None,
                }
            }
            Err(err) => {
                warn!(transaction_id, error = %err, "Approval submission failed");
                ApprovalOutcome {
                    success: false,
                    message: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrossmintConfig;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> CrossmintClient {
        CrossmintClient::new(&CrossmintConfig {
            base_url: base_url.to_owned(),
            api_key: SecretString::from("sk_test_A7fQ29zXmP4vK8wN3rT6y"),
        })
        .expect("client builds")
    }

    fn wallet() -> WalletAddress {
        WalletAddress::new("0x2222222222222222222222222222222222222222")
    }

    fn metadata() -> AuthenticatorMetadata {
        AuthenticatorMetadata {
            authenticator_data: "authdata".to_owned(),
            challenge_index: 23,
            client_data_json: "{\"type\":\"webauthn.get\"}".to_owned(),
            type_index: 1,
            user_verification_required: true,
        }
    }

    #[tokio::test]
    async fn test_sign_accepted_with_pending_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/wallets/{}/transactions",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "tx_9",
                "status": "awaiting-approval"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = SigningCoordinator::new(client(&server.uri()))
            .sign(&wallet(), "0xserialized", Chain::Base)
            .await;

        assert!(result.success);
        assert_eq!(result.transaction_id.as_deref(), Some("tx_9"));
        assert!(result.is_awaiting_approval());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_sign_failure_is_a_value_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/wallets/{}/transactions",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "internal wallet error"
            })))
            .expect(1) // exactly one submission, no retry
            .mount(&server)
            .await;

        let result = SigningCoordinator::new(client(&server.uri()))
            .sign(&wallet(), "0xserialized", Chain::Base)
            .await;

        assert!(!result.success);
        assert!(!result.is_awaiting_approval());
        let reason = result.error.expect("failure carries a reason");
        assert!(reason.contains("internal wallet error"));
    }

    #[tokio::test]
    async fn test_fetch_pending_approval_takes_first_entry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!(
                "/wallets/{}/transactions/tx_1",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "tx_1",
                "status": "awaiting-approval",
                "approvals": {
                    "pending": [
                        { "signer": "evm-passkey:cred-1", "message": "0xchallenge-1" },
                        { "signer": "evm-passkey:cred-2", "message": "0xchallenge-2" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let state = ApprovalRelay::new(client(&server.uri()))
            .fetch_pending_approval(&wallet(), "tx_1")
            .await
            .expect("fetch succeeds");

        assert_eq!(
            state,
            ApprovalState::Pending(PendingApproval {
                transaction_id: "tx_1".to_owned(),
                message: "0xchallenge-1".to_owned(),
                signer: "evm-passkey:cred-1".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_pending_approval_other_status_is_informational() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!(
                "/wallets/{}/transactions/tx_2",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "tx_2",
                "status": "success"
            })))
            .mount(&server)
            .await;

        let state = ApprovalRelay::new(client(&server.uri()))
            .fetch_pending_approval(&wallet(), "tx_2")
            .await
            .expect("fetch succeeds");

        assert_eq!(
            state,
            ApprovalState::NotAwaitingApproval {
                status: "success".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_pending_approval_empty_list_not_pending() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!(
                "/wallets/{}/transactions/tx_3",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "tx_3",
                "status": "awaiting-approval",
                "approvals": { "pending": [] }
            })))
            .mount(&server)
            .await;

        let state = ApprovalRelay::new(client(&server.uri()))
            .fetch_pending_approval(&wallet(), "tx_3")
            .await
            .expect("fetch succeeds");

        assert!(matches!(state, ApprovalState::NotAwaitingApproval { .. }));
    }

    #[tokio::test]
    async fn test_submit_approval_wraps_single_element_list() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/wallets/{}/transactions/tx_4/approvals",
                wallet().as_str()
            )))
            .and(body_partial_json(json!({
                "approvals": [{
                    "signer": "evm-passkey:cred-1",
                    "signature": { "r": "0xr", "s": "0xs" },
                    "metadata": { "challengeIndex": 23, "typeIndex": 1 }
                }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = ApprovalRelay::new(client(&server.uri()))
            .submit_approval(
                &wallet(),
                "tx_4",
                ApprovalSubmission {
                    signer: "evm-passkey:cred-1".to_owned(),
                    signature_r: "0xr".to_owned(),
                    signature_s: "0xs".to_owned(),
                    metadata: metadata(),
                },
            )
            .await;

        assert!(outcome.success);
        assert!(outcome.message.is_none());
    }

    #[tokio::test]
    async fn test_submit_approval_non_201_is_structured_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!(
                "/wallets/{}/transactions/tx_5/approvals",
                wallet().as_str()
            )))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "signature does not match the expected signer"
            })))
            .mount(&server)
            .await;

        let outcome = ApprovalRelay::new(client(&server.uri()))
            .submit_approval(
                &wallet(),
                "tx_5",
                ApprovalSubmission {
                    signer: "evm-passkey:cred-1".to_owned(),
                    signature_r: "0xr".to_owned(),
                    signature_s: "0xs".to_owned(),
                    metadata: metadata(),
                },
            )
            .await;

        assert!(!outcome.success);
        let message = outcome.message.expect("failure carries a message");
        assert!(message.contains("signature does not match"));
    }
}
