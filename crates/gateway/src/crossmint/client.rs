//! HTTP client for the Crossmint checkout and wallet endpoints.

use std::time::Duration;

use mintcart_core::{Chain, WalletAddress};
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::CrossmintError;
use super::types::{
    ApiErrorBody, CreateOrderResponse, Order, OrderRequest, ProductSupportResponse,
    SubmitApprovalRequest, SubmitTransactionRequest, TokenBalance, TransactionParams,
    TransactionResponse,
};
use crate::config::CrossmintConfig;

/// Timeout for order creation and transaction submission.
const LONG_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for status and detail fetches.
const SHORT_TIMEOUT: Duration = Duration::from_secs(15);

/// TTL for cached product-support probes.
const SUPPORT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of cached product-support probes.
const SUPPORT_CACHE_CAPACITY: u64 = 1_000;

/// The outcome of submitting a transaction for signing, as accepted by the
/// provider. Callers must inspect `status` - an accepted submission may
/// still be awaiting an out-of-band approval.
#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    /// Provider-assigned transaction identifier.
    pub id: Option<String>,
    /// Embedded transaction status (e.g. "pending", "awaiting-approval").
    pub status: Option<String>,
    /// The raw provider payload, kept for diagnostics.
    pub raw: serde_json::Value,
}

/// Crossmint API client.
#[derive(Clone)]
pub struct CrossmintClient {
    client: reqwest::Client,
    base_url: String,
    support_cache: Cache<String, bool>,
}

impl std::fmt::Debug for CrossmintClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossmintClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CrossmintClient {
    /// Create a new Crossmint API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CrossmintConfig) -> Result<Self, CrossmintError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-API-KEY",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| CrossmintError::InvalidApiKey(e.to_string()))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let support_cache = Cache::builder()
            .max_capacity(SUPPORT_CACHE_CAPACITY)
            .time_to_live(SUPPORT_CACHE_TTL)
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            support_cache,
        })
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns [`CrossmintError::Api`] on a non-success status and
    /// [`CrossmintError::InvalidResponseShape`] when the body does not parse.
    #[instrument(skip(self, request))]
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, CrossmintError> {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(LONG_TIMEOUT)
            .json(request)
            .send()
            .await?;

        let envelope: CreateOrderResponse = Self::decode(response).await?;
        debug!(order_id = %envelope.order.order_id, "Order created");
        Ok(envelope.order)
    }

    /// Probe whether a product locator is purchasable at all.
    ///
    /// Results are cached for five minutes - the answer only changes when
    /// the provider's catalog integration does.
    ///
    /// # Errors
    ///
    /// Returns error if the probe request fails.
    #[instrument(skip(self))]
    pub async fn check_product_support(&self, locator: &str) -> Result<bool, CrossmintError> {
        if let Some(supported) = self.support_cache.get(locator).await {
            return Ok(supported);
        }

        let url = format!(
            "{}/orders/tokens/support?productLocator={}",
            self.base_url,
            urlencoding::encode(locator)
        );

        let response = self.client.get(&url).timeout(SHORT_TIMEOUT).send().await?;
        let body: ProductSupportResponse = Self::decode(response).await?;

        self.support_cache
            .insert(locator.to_owned(), body.is_supported)
            .await;
        Ok(body.is_supported)
    }

    // ========================================================================
    // Wallet transactions
    // ========================================================================

    /// Submit a serialized transaction to a wallet for signing.
    ///
    /// HTTP 200/201 means the submission was accepted; the embedded status
    /// still has to be inspected by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CrossmintError::Api`] for any other status and
    /// [`CrossmintError::Http`] on network failure.
    #[instrument(skip(self, transaction), fields(wallet = %wallet.masked()))]
    pub async fn submit_transaction(
        &self,
        wallet: &WalletAddress,
        transaction: &str,
        chain: Chain,
    ) -> Result<SubmittedTransaction, CrossmintError> {
        let url = format!("{}/wallets/{}/transactions", self.base_url, wallet.as_str());

        let body = SubmitTransactionRequest {
            params: TransactionParams {
                transaction: transaction.to_owned(),
                chain,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(LONG_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(Self::api_error(status, response).await);
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CrossmintError::InvalidResponseShape(e.to_string()))?;

        Ok(SubmittedTransaction {
            id: raw.get("id").and_then(|v| v.as_str()).map(String::from),
            status: raw.get("status").and_then(|v| v.as_str()).map(String::from),
            raw,
        })
    }

    /// Fetch the current state of a wallet transaction.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(wallet = %wallet.masked()))]
    pub async fn get_transaction(
        &self,
        wallet: &WalletAddress,
        transaction_id: &str,
    ) -> Result<TransactionResponse, CrossmintError> {
        let url = format!(
            "{}/wallets/{}/transactions/{transaction_id}",
            self.base_url,
            wallet.as_str()
        );

        let response = self.client.get(&url).timeout(SHORT_TIMEOUT).send().await?;
        Self::decode(response).await
    }

    /// Submit a completed approval for a pending transaction.
    ///
    /// Success is solely HTTP 201.
    ///
    /// # Errors
    ///
    /// Returns [`CrossmintError::Api`] for any other status.
    #[instrument(skip(self, request), fields(wallet = %wallet.masked()))]
    pub async fn submit_approval(
        &self,
        wallet: &WalletAddress,
        transaction_id: &str,
        request: &SubmitApprovalRequest,
    ) -> Result<(), CrossmintError> {
        let url = format!(
            "{}/wallets/{}/transactions/{transaction_id}/approvals",
            self.base_url,
            wallet.as_str()
        );

        let response = self
            .client
            .post(&url)
            .timeout(LONG_TIMEOUT)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(Self::api_error(status, response).await);
        }

        debug!(transaction_id, "Approval submitted");
        Ok(())
    }

    // ========================================================================
    // Balances
    // ========================================================================

    /// Fetch the wallet's total USDC balance as a display string.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no USDC entry is present.
    #[instrument(skip(self), fields(wallet = %wallet.masked()))]
    pub async fn fetch_usdc_balance(
        &self,
        wallet: &WalletAddress,
    ) -> Result<String, CrossmintError> {
        let url = format!(
            "{}/wallets/{}/balances?tokens=usdc",
            self.base_url,
            wallet.as_str()
        );

        let response = self.client.get(&url).timeout(SHORT_TIMEOUT).send().await?;
        let balances: Vec<TokenBalance> = Self::decode(response).await?;

        balances
            .iter()
            .find(|b| b.token.eq_ignore_ascii_case("usdc"))
            .and_then(|b| b.balances.get("total").cloned())
            .ok_or_else(|| {
                CrossmintError::InvalidResponseShape("no usdc balance in response".to_owned())
            })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Decode a success response, or map the failure.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CrossmintError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response).await);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(status = status.as_u16(), error = %e, "Provider response failed schema validation");
            CrossmintError::InvalidResponseShape(e.to_string())
        })
    }

    /// Build an [`CrossmintError::Api`] from a failed response, preferring
    /// the provider's `message` field when the body carries one.
    async fn api_error(status: StatusCode, response: reqwest::Response) -> CrossmintError {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);

        CrossmintError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CrossmintClient {
        CrossmintClient::new(&CrossmintConfig {
            base_url: base_url.to_owned(),
            api_key: SecretString::from("sk_test_A7fQ29zXmP4vK8wN3rT6y"),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn test_create_order_sends_api_key_and_parses_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(header("X-API-KEY", "sk_test_A7fQ29zXmP4vK8wN3rT6y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order": {
                    "orderId": "order_42",
                    "payment": { "preparation": { "serializedTransaction": "0xbeef" } }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let request = sample_order_request();

        let order = client.create_order(&request).await.expect("order created");
        assert_eq!(order.order_id, "order_42");
        assert_eq!(order.serialized_transaction(), Some("0xbeef"));
    }

    #[tokio::test]
    async fn test_create_order_maps_provider_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "message": "Product with locator amazon:XYZ could not be found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .create_order(&sample_order_request())
            .await
            .expect_err("provider rejected");

        match &err {
            CrossmintError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert!(message.contains("could not be found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_product_not_found());
    }

    #[tokio::test]
    async fn test_create_order_invalid_shape_is_distinct() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": 1 })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .create_order(&sample_order_request())
            .await
            .expect_err("shape mismatch");

        assert!(matches!(err, CrossmintError::InvalidResponseShape(_)));
    }

    #[tokio::test]
    async fn test_product_support_probe_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders/tokens/support"))
            .and(query_param("productLocator", "amazon:B01DFKC2SO"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "isSupported": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client
            .check_product_support("amazon:B01DFKC2SO")
            .await
            .expect("probe"));
        // Second call must be served from cache (mock expects exactly 1 hit)
        assert!(client
            .check_product_support("amazon:B01DFKC2SO")
            .await
            .expect("cached probe"));
    }

    #[tokio::test]
    async fn test_submit_approval_requires_201() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/wallets/0xabc/transactions/tx_1/approvals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let wallet = WalletAddress::new("0xabc");
        let request = SubmitApprovalRequest { approvals: vec![] };

        // 200 is NOT success for approval submission
        let err = client
            .submit_approval(&wallet, "tx_1", &request)
            .await
            .expect_err("only 201 is success");
        assert!(matches!(err, CrossmintError::Api { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_fetch_usdc_balance_reads_total() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/wallets/0xabc/balances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "token": "usdc", "balances": { "total": "25.50", "base": "25.50" } }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let balance = client
            .fetch_usdc_balance(&WalletAddress::new("0xabc"))
            .await
            .expect("balance");
        assert_eq!(balance, "25.50");
    }

    fn sample_order_request() -> OrderRequest {
        use super::super::types::{LineItemRequest, PaymentIntent, PhysicalAddress, Recipient};
        use mintcart_core::Currency;

        OrderRequest {
            recipient: Recipient {
                email: "buyer@example.com".to_owned(),
                physical_address: PhysicalAddress {
                    name: "Jordan Doe".to_owned(),
                    line1: "1 Main St".to_owned(),
                    line2: None,
                    city: "Springfield".to_owned(),
                    state: Some("IL".to_owned()),
                    post_code: "62701".to_owned(),
                    country: "US".to_owned(),
                },
            },
            payment: PaymentIntent {
                method: Chain::Base,
                currency: Currency::Usdc,
                payer_address: "0xabc".to_owned(),
                receipt_email: None,
            },
            line_items: vec![LineItemRequest {
                product_locator: "amazon:B01DFKC2SO".to_owned(),
            }],
        }
    }
}
