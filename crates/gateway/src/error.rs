//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::crossmint::CrossmintError;
use crate::services::order::{OrderBuildError, OrderError};

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream checkout/wallet API operation failed.
    #[error("Provider error: {0}")]
    Provider(#[from] CrossmintError),

    /// Order building or submission failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Caller input failed validation before any state mutation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OrderBuildError> for AppError {
    fn from(err: OrderBuildError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Provider(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Order(err) => match err {
                // Every locator format was rejected - the item itself is the
                // problem, not the gateway or the provider.
                OrderError::AllLocatorFormatsExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::Provider(_) => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Provider(_) => "Checkout provider error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Order(OrderError::Provider(_)) => "Checkout provider error".to_string(),
            Self::Order(err @ OrderError::AllLocatorFormatsExhausted { .. }) => err.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user 42".to_string());
        assert_eq!(err.to_string(), "Not found: user 42");

        let err = AppError::BadRequest("missing walletAddress".to_string());
        assert_eq!(err.to_string(), "Bad request: missing walletAddress");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Provider(CrossmintError::Api {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::AllLocatorFormatsExhausted {
                last: CrossmintError::Api {
                    status: 400,
                    message: "not found".to_string()
                }
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_build_errors_map_to_bad_request() {
        let err: AppError =
            OrderBuildError::LocatorExtractionFailed("https://example.com".to_string()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
