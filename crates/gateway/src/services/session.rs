//! Per-user wallet session state.
//!
//! The authoritative session store lives outside this process (the bot's
//! profile storage); [`SessionStore`] is the seam. The in-memory
//! implementation backs local deployments and tests. Updates are
//! last-write-wins - the conversational interface serializes a given
//! user's actions, so no finer coordination is needed.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mintcart_core::{UserId, WalletAddress};
use secrecy::SecretString;

/// Wallet-auth state for one user.
#[derive(Clone)]
pub struct WalletSession {
    /// The user's smart wallet address.
    pub wallet_address: WalletAddress,
    /// The wallet provider's own user identifier.
    pub provider_user_id: String,
    /// Email the user registered with, if known.
    pub email: Option<String>,
    /// Provider auth token, if one was delivered with the wallet webhook.
    pub auth_token: Option<SecretString>,
    /// Whether a bot-held signer may approve transactions automatically.
    pub delegated: bool,
    /// When the wallet was linked to this user.
    pub linked_at: DateTime<Utc>,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("wallet_address", &self.wallet_address.masked())
            .field("provider_user_id", &self.provider_user_id)
            .field("email", &self.email)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("delegated", &self.delegated)
            .field("linked_at", &self.linked_at)
            .finish()
    }
}

/// Key-value session storage by user identifier.
pub trait SessionStore: Send + Sync {
    /// Look up a user's wallet session.
    fn get(&self, user: UserId) -> Option<WalletSession>;

    /// Insert or replace a user's wallet session (last-write-wins).
    fn upsert(&self, user: UserId, session: WalletSession);

    /// Mark whether the user has delegated transaction approval.
    /// Returns false when no session exists.
    fn set_delegated(&self, user: UserId, delegated: bool) -> bool;

    /// Remove a user's session. Returns whether anything was cleared.
    fn clear(&self, user: UserId) -> bool;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<UserId, WalletSession>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user: UserId) -> Option<WalletSession> {
        self.sessions.get(&user).map(|entry| entry.clone())
    }

    fn upsert(&self, user: UserId, session: WalletSession) {
        self.sessions.insert(user, session);
    }

    fn set_delegated(&self, user: UserId, delegated: bool) -> bool {
        match self.sessions.get_mut(&user) {
            Some(mut entry) => {
                entry.delegated = delegated;
                true
            }
            None => false,
        }
    }

    fn clear(&self, user: UserId) -> bool {
        self.sessions.remove(&user).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(address: &str) -> WalletSession {
        WalletSession {
            wallet_address: WalletAddress::new(address),
            provider_user_id: "cm_user_1".to_owned(),
            email: Some("buyer@example.com".to_owned()),
            auth_token: None,
            delegated: false,
            linked_at: Utc::now(),
        }
    }

    #[test]
    fn test_get_missing_user() {
        let store = InMemorySessionStore::new();
        assert!(store.get(UserId::new(1)).is_none());
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(7);

        store.upsert(user, session("0xfirst"));
        store.upsert(user, session("0xsecond"));

        let current = store.get(user).expect("session present");
        assert_eq!(current.wallet_address.as_str(), "0xsecond");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(8);

        store.upsert(user, session("0xsame"));
        let first = store.get(user).expect("session present");
        store.upsert(user, session("0xsame"));
        let second = store.get(user).expect("session present");

        assert_eq!(first.wallet_address, second.wallet_address);
        assert_eq!(first.provider_user_id, second.provider_user_id);
    }

    #[test]
    fn test_set_delegated() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(9);

        assert!(!store.set_delegated(user, true));

        store.upsert(user, session("0xwallet"));
        assert!(store.set_delegated(user, true));
        assert!(store.get(user).expect("session present").delegated);
    }

    #[test]
    fn test_clear_reports_whether_anything_was_removed() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(10);

        assert!(!store.clear(user));
        store.upsert(user, session("0xwallet"));
        assert!(store.clear(user));
        assert!(store.get(user).is_none());
    }

    #[test]
    fn test_debug_masks_wallet_and_token() {
        let mut s = session("0xAbC1234567890dEf1234567890abcdef12349fE3");
        s.auth_token = Some(SecretString::from("jwt-secret-token"));
        let debug_output = format!("{s:?}");
        assert!(debug_output.contains("0xAbC1...9fE3"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("jwt-secret-token"));
    }
}
