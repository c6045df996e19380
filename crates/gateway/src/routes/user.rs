//! Wallet lookup for a user.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mintcart_core::UserId;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/user/{user_id}/wallet` - wallet details for a user.
///
/// The no-wallet case is an expected lookup miss, so it gets a structured
/// 404 body (`hasWallet: false`) rather than the generic error shape.
#[instrument(skip(state))]
pub async fn wallet(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user: UserId = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("user id must be numeric".to_owned()))?;

    let Some(session) = state.sessions().get(user) else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "hasWallet": false })),
        )
            .into_response());
    };

    Ok(Json(json!({
        "hasWallet": true,
        "walletAddress": session.wallet_address.as_str(),
        "walletAddressMasked": session.wallet_address.masked(),
        "crossmintUserId": session.provider_user_id,
        "email": session.email,
        "delegated": session.delegated,
        "linkedAt": session.linked_at.to_rfc3339(),
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use mintcart_core::WalletAddress;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{CrossmintConfig, GatewayConfig};
    use crate::services::notifier::testing::RecordingNotifier;
    use crate::services::{InMemorySessionStore, SessionStore, WalletSession};

    fn test_state() -> (AppState, Arc<InMemorySessionStore>) {
        let sessions = Arc::new(InMemorySessionStore::new());
        let config = GatewayConfig {
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 0,
            crossmint: CrossmintConfig {
                base_url: "http://127.0.0.1:9".to_owned(),
                api_key: SecretString::from("sk_test_A7fQ29zXmP4vK8wN3rT6y"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state =
            AppState::with_collaborators(config, sessions.clone(), Arc::new(RecordingNotifier::new()))
                .expect("state builds");
        (state, sessions)
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = crate::routes::routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("handler responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_wallet_lookup_returns_masked_and_full_address() {
        let (state, sessions) = test_state();
        sessions.upsert(
            UserId::new(5),
            WalletSession {
                wallet_address: WalletAddress::new(
                    "0xAbC1234567890dEf1234567890abcdef12349fE3",
                ),
                provider_user_id: "cm_user_5".to_owned(),
                email: Some("buyer@example.com".to_owned()),
                auth_token: None,
                delegated: true,
                linked_at: Utc::now(),
            },
        );

        let (status, body) = get(state, "/api/user/5/wallet").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasWallet"], true);
        assert_eq!(
            body["walletAddress"],
            "0xAbC1234567890dEf1234567890abcdef12349fE3"
        );
        assert_eq!(body["walletAddressMasked"], "0xAbC1...9fE3");
        assert_eq!(body["crossmintUserId"], "cm_user_5");
        assert_eq!(body["delegated"], true);
    }

    #[tokio::test]
    async fn test_wallet_lookup_miss_is_structured_404() {
        let (state, _) = test_state();

        let (status, body) = get(state, "/api/user/999/wallet").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["hasWallet"], false);
    }

    #[tokio::test]
    async fn test_wallet_lookup_rejects_non_numeric_id() {
        let (state, _) = test_state();

        let (status, _) = get(state, "/api/user/abc/wallet").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
