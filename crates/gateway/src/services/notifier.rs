//! User notification boundary.
//!
//! The chat transport (bot) is an external collaborator; this module only
//! defines the send-message capability the settlement flow needs. Delivery
//! failures are logged by callers and never retried - state changes and
//! notifications are deliberately not transactional with each other.

use async_trait::async_trait;
use mintcart_core::UserId;
use thiserror::Error;
use tracing::info;

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport rejected or could not deliver the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// An actionable follow-up attached to a message (rendered as an inline
/// button by the chat transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction {
    /// Button label.
    pub label: String,
    /// Opaque action payload (command or URL) for the transport.
    pub action: String,
}

/// A formatted outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub actions: Vec<InlineAction>,
}

impl OutboundMessage {
    /// A plain text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    /// Attach inline actions.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<InlineAction>) -> Self {
        self.actions = actions;
        self
    }
}

/// Send-message capability of the chat transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message to a user.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails. Callers log and move on.
    async fn send(&self, user: UserId, message: OutboundMessage) -> Result<(), NotifyError>;
}

/// Notifier that only logs. Used when no chat transport is wired up
/// (local development, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, user: UserId, message: OutboundMessage) -> Result<(), NotifyError> {
        info!(
            user = %user,
            actions = message.actions.len(),
            text = %message.text,
            "Notification (log only)"
        );
        Ok(())
    }
}
