//! Order building and submission.
//!
//! The submission engine walks the ordered locator candidates produced by
//! the resolver. This is a format search against an underspecified locator
//! grammar, not a transient-fault retry: there is no backoff, candidates are
//! tried strictly sequentially, and only the "product not found" failure
//! class advances the loop. Anything else aborts immediately.

use mintcart_core::{AddressError, Chain, Currency, ShippingAddress, WalletAddress};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::locator;
use crate::crossmint::{
    CrossmintClient, CrossmintError, LineItemRequest, Order, OrderRequest, PaymentIntent,
    PhysicalAddress, Recipient,
};

/// Errors raised while assembling an order request, before any network call.
#[derive(Debug, Error)]
pub enum OrderBuildError {
    /// Shipping address failed policy validation.
    #[error("address rejected: {0}")]
    AddressRejected(#[from] AddressError),

    /// No product locator could be derived from the URL.
    #[error("could not extract a product locator from {0:?}")]
    LocatorExtractionFailed(String),
}

/// Errors raised by order submission.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Every locator format candidate was rejected as unknown.
    #[error("all locator formats exhausted (last error: {last})")]
    AllLocatorFormatsExhausted {
        #[source]
        last: CrossmintError,
    },

    /// A terminal provider error on the current attempt.
    #[error(transparent)]
    Provider(#[from] CrossmintError),
}

/// Terminal classification of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The order is payable; `serialized_transaction` is ready to sign.
    Succeeded {
        order_id: String,
        serialized_transaction: String,
    },
    /// The payer wallet cannot cover the quote.
    InsufficientFunds { order_id: String },
    /// The provider needs a physical address before quoting.
    AddressRequired { order_id: String },
    /// The item exists but cannot be purchased through the provider.
    Unsupported { order_id: String },
}

/// Quote status indicating the provider wants a shipping address.
const QUOTE_REQUIRES_ADDRESS: &str = "requires-physical-address";

/// Payment status indicating the payer wallet cannot cover the total.
const PAYMENT_INSUFFICIENT_FUNDS: &str = "insufficient-funds";

/// An order request paired with the locator candidates to try for it.
#[derive(Debug, Clone)]
pub struct PreparedOrder {
    pub request: OrderRequest,
    pub candidates: Vec<String>,
}

/// Assembles complete order requests from caller data plus policy defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderBuilder;

impl OrderBuilder {
    /// Select the settlement chain for a payer wallet.
    ///
    /// Currently a constant policy; the hook exists so a per-wallet policy
    /// can be substituted without touching the builder contract.
    #[must_use]
    pub const fn select_chain(_wallet: &WalletAddress) -> Chain {
        Chain::Base
    }

    /// Build an order request and its locator retry sequence.
    ///
    /// Address validation happens here, before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`OrderBuildError::AddressRejected`] for non-US addresses or
    /// US addresses without a state, and
    /// [`OrderBuildError::LocatorExtractionFailed`] when the URL carries no
    /// recognizable product identifier.
    pub fn build(
        product_url: &str,
        email: &str,
        wallet: &WalletAddress,
        shipping: &ShippingAddress,
    ) -> Result<PreparedOrder, OrderBuildError> {
        shipping.validate()?;

        let asin = locator::extract_asin(product_url)
            .ok_or_else(|| OrderBuildError::LocatorExtractionFailed(product_url.to_owned()))?;
        let candidates = locator::locator_variations(&asin, product_url);

        let canonical = candidates
            .first()
            .cloned()
            .unwrap_or_else(|| format!("amazon:{asin}"));

        let request = OrderRequest {
            recipient: Recipient {
                email: email.to_owned(),
                physical_address: PhysicalAddress::from(shipping),
            },
            payment: PaymentIntent {
                method: Self::select_chain(wallet),
                currency: Currency::Usdc,
                payer_address: wallet.as_str().to_owned(),
                receipt_email: Some(email.to_owned()),
            },
            line_items: vec![LineItemRequest {
                product_locator: canonical,
            }],
        };

        Ok(PreparedOrder {
            request,
            candidates,
        })
    }
}

/// Submits orders to the provider, retrying across locator formats only for
/// the "unknown product" failure class.
#[derive(Debug, Clone)]
pub struct SubmissionEngine {
    client: CrossmintClient,
}

impl SubmissionEngine {
    /// Create a new submission engine.
    #[must_use]
    pub const fn new(client: CrossmintClient) -> Self {
        Self { client }
    }

    /// Submit an order, walking the locator candidates in order.
    ///
    /// Stops at the first successful response. A "product not found" error
    /// records the failure and advances to the next candidate; any other
    /// error aborts immediately.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AllLocatorFormatsExhausted`] when every
    /// candidate is rejected as unknown, or [`OrderError::Provider`] for the
    /// first non-recoverable failure.
    #[instrument(skip(self, prepared), fields(candidates = prepared.candidates.len()))]
    pub async fn submit(&self, prepared: &PreparedOrder) -> Result<OrderOutcome, OrderError> {
        let mut request = prepared.request.clone();
        let mut last_error: Option<CrossmintError> = None;

        for candidate in &prepared.candidates {
            for item in &mut request.line_items {
                item.product_locator.clone_from(candidate);
            }

            match self.client.create_order(&request).await {
                Ok(order) => {
                    debug!(locator = %candidate, order_id = %order.order_id, "Order accepted");
                    return Ok(Self::classify(&order));
                }
                Err(err) if err.is_product_not_found() => {
                    warn!(locator = %candidate, error = %err, "Locator rejected, trying next format");
                    last_error = Some(err);
                }
                Err(err) => return Err(OrderError::Provider(err)),
            }
        }

        Err(OrderError::AllLocatorFormatsExhausted {
            last: last_error.unwrap_or_else(|| CrossmintError::Api {
                status: 0,
                message: "no locator candidates attempted".to_owned(),
            }),
        })
    }

    /// Classify a parsed order into its terminal outcome.
    #[must_use]
    pub fn classify(order: &Order) -> OrderOutcome {
        let order_id = order.order_id.clone();

        let payment_status = order
            .payment
            .as_ref()
            .and_then(|payment| payment.status.as_deref());
        if payment_status == Some(PAYMENT_INSUFFICIENT_FUNDS) {
            return OrderOutcome::InsufficientFunds { order_id };
        }

        let quote_status = order
            .quote
            .as_ref()
            .and_then(|quote| quote.status.as_deref());
        if quote_status == Some(QUOTE_REQUIRES_ADDRESS) {
            return OrderOutcome::AddressRequired { order_id };
        }

        match order.serialized_transaction() {
            Some(transaction) => OrderOutcome::Succeeded {
                order_id,
                serialized_transaction: transaction.to_owned(),
            },
            None => OrderOutcome::Unsupported { order_id },
        }
    }
}
