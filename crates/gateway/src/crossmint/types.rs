//! Wire types for the Crossmint checkout and wallet APIs.
//!
//! The provider's response schema is full of optional/variant substructures:
//! quote, delivery, and payment preparation may or may not be present
//! depending on order phase. Everything variant is modelled as an explicit
//! `Option` and validated by serde at the boundary - a body that does not
//! fit these shapes is rejected as [`InvalidResponseShape`] instead of being
//! probed dynamically.
//!
//! [`InvalidResponseShape`]: super::CrossmintError::InvalidResponseShape

use mintcart_core::{Chain, Currency, ShippingAddress};
use serde::{Deserialize, Serialize};

// ============================================================================
// Order creation (request)
// ============================================================================

/// A complete create-order request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub recipient: Recipient,
    pub payment: PaymentIntent,
    pub line_items: Vec<LineItemRequest>,
}

/// Order recipient: email plus shipping destination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email: String,
    pub physical_address: PhysicalAddress,
}

/// Shipping destination in the provider's field layout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    pub name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub post_code: String,
    pub country: String,
}

impl From<&ShippingAddress> for PhysicalAddress {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            name: address.name.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            post_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// How the order will be paid: settlement chain, currency, and payer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Settlement chain identifier (the provider calls this `method`).
    pub method: Chain,
    pub currency: Currency,
    pub payer_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_email: Option<String>,
}

/// One purchasable item, identified by its product locator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_locator: String,
}

// ============================================================================
// Order (response)
// ============================================================================

/// Envelope returned by `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: Order,
    #[serde(default)]
    pub order_client_secret: Option<String>,
}

/// A created order with its quote and payment state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub quote: Option<OrderQuote>,
    #[serde(default)]
    pub payment: Option<OrderPayment>,
}

impl Order {
    /// The serialized settlement transaction, when payment preparation
    /// produced one.
    #[must_use]
    pub fn serialized_transaction(&self) -> Option<&str> {
        self.payment
            .as_ref()?
            .preparation
            .as_ref()?
            .serialized_transaction
            .as_deref()
            .filter(|tx| !tx.is_empty())
    }
}

/// One line item of an order with its quote/delivery sub-state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub quote: Option<ItemQuote>,
    #[serde(default)]
    pub delivery: Option<ItemDelivery>,
}

/// Per-item quote state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuote {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub unavailability_reason: Option<UnavailabilityReason>,
    #[serde(default)]
    pub charges: Option<ItemCharges>,
}

/// Why an item cannot currently be quoted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailabilityReason {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-item charge breakdown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCharges {
    #[serde(default)]
    pub unit: Option<Money>,
}

/// Per-item delivery state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDelivery {
    #[serde(default)]
    pub status: Option<String>,
}

/// Overall order quote: status, total, expiry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuote {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_price: Option<Money>,
    #[serde(default)]
    pub quoted_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// An amount plus currency, both kept as provider strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency: String,
}

/// Payment record of an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayment {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub preparation: Option<PaymentPreparation>,
}

/// Prepared settlement details for a payable order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreparation {
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub payer_address: Option<String>,
    #[serde(default)]
    pub serialized_transaction: Option<String>,
}

// ============================================================================
// Wallet transactions
// ============================================================================

/// Body for `POST /wallets/{address}/transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTransactionRequest {
    pub params: TransactionParams,
}

/// Transaction parameters: the serialized payload and its target chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    pub transaction: String,
    pub chain: Chain,
}

/// A wallet transaction as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub approvals: Option<TransactionApprovals>,
}

/// Approval book-keeping on a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionApprovals {
    #[serde(default)]
    pub pending: Vec<PendingApprovalEntry>,
    #[serde(default)]
    pub submitted: Vec<serde_json::Value>,
}

/// One pending approval: who must sign, and the challenge to sign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalEntry {
    pub signer: String,
    pub message: String,
}

// ============================================================================
// Approval submission
// ============================================================================

/// Body for `POST /wallets/{address}/transactions/{id}/approvals`.
///
/// The provider expects a single-element approvals list.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitApprovalRequest {
    pub approvals: Vec<ApprovalEntry>,
}

/// One completed approval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEntry {
    pub signer: String,
    pub signature: ApprovalSignature,
    pub metadata: AuthenticatorMetadata,
}

/// The two numeric components of a P-256 passkey signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSignature {
    pub r: String,
    pub s: String,
}

/// WebAuthn assertion metadata accompanying a passkey signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorMetadata {
    pub authenticator_data: String,
    pub challenge_index: u32,
    pub client_data_json: String,
    pub type_index: u32,
    pub user_verification_required: bool,
}

// ============================================================================
// Balances & product support
// ============================================================================

/// One token balance entry from `GET /wallets/{address}/balances`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token: String,
    #[serde(default)]
    pub balances: std::collections::HashMap<String, String>,
}

/// Response of the product-support capability probe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSupportResponse {
    pub is_supported: bool,
}

/// Provider error body, when it bothers to send one.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
