//! Crossmint headless-checkout and wallet API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest` with a static `X-API-KEY` credential header
//! - Two fixed timeout classes: long for order creation and transaction
//!   submission, short for status/detail fetches
//! - Response bodies are serde-validated at the boundary; a structurally
//!   invalid body is an [`CrossmintError::InvalidResponseShape`], never
//!   silently coerced
//! - Product-support probes are cached in-memory via `moka` (5 minute TTL)

mod client;
pub mod types;

pub use client::{CrossmintClient, SubmittedTransaction};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Crossmint API.
#[derive(Debug, Error)]
pub enum CrossmintError {
    /// HTTP request failed (includes timeouts and connection failures).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body failed structural validation.
    #[error("Invalid response shape: {0}")]
    InvalidResponseShape(String),

    /// The configured API key cannot be used as a header value.
    #[error("Invalid API key format: {0}")]
    InvalidApiKey(String),
}

impl CrossmintError {
    /// Whether this is the recoverable "product not found" failure class
    /// that triggers the locator-format fallback.
    ///
    /// The provider reports an unknown product locator as HTTP 400 with a
    /// "not found" phrase in the message; every other error class is
    /// terminal for the current submission.
    #[must_use]
    pub fn is_product_not_found(&self) -> bool {
        match self {
            Self::Api { status: 400, message } => {
                message.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }
}
