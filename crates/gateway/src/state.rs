//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::crossmint::{CrossmintClient, CrossmintError};
use crate::services::{
    ApprovalRelay, InMemorySessionStore, LogNotifier, Notifier, SessionStore, SigningCoordinator,
    SubmissionEngine,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: the provider client, the orchestration services, the
/// session store, and the notification transport.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    crossmint: CrossmintClient,
    submission: SubmissionEngine,
    signing: SigningCoordinator,
    approvals: ApprovalRelay,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create application state with the default in-memory session store
    /// and log-only notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, CrossmintError> {
        Self::with_collaborators(
            config,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(LogNotifier),
        )
    }

    /// Create application state with explicit session store and notifier.
    ///
    /// The seam used by tests and by deployments that wire a real chat
    /// transport or external session storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be constructed.
    pub fn with_collaborators(
        config: GatewayConfig,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CrossmintError> {
        let crossmint = CrossmintClient::new(&config.crossmint)?;
        let submission = SubmissionEngine::new(crossmint.clone());
        let signing = SigningCoordinator::new(crossmint.clone());
        let approvals = ApprovalRelay::new(crossmint.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                crossmint,
                submission,
                signing,
                approvals,
                sessions,
                notifier,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the Crossmint API client.
    #[must_use]
    pub fn crossmint(&self) -> &CrossmintClient {
        &self.inner.crossmint
    }

    /// Get a reference to the order submission engine.
    #[must_use]
    pub fn submission(&self) -> &SubmissionEngine {
        &self.inner.submission
    }

    /// Get a reference to the transaction signing coordinator.
    #[must_use]
    pub fn signing(&self) -> &SigningCoordinator {
        &self.inner.signing
    }

    /// Get a reference to the approval relay.
    #[must_use]
    pub fn approvals(&self) -> &ApprovalRelay {
        &self.inner.approvals
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.sessions.as_ref()
    }

    /// Get a reference to the notification transport.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }
}
