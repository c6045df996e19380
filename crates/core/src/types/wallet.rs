//! Wallet address newtype with display masking.

use serde::{Deserialize, Serialize};

/// Number of leading characters kept when masking an address.
const MASK_PREFIX_LEN: usize = 6;
/// Number of trailing characters kept when masking an address.
const MASK_SUFFIX_LEN: usize = 4;

/// An on-chain wallet address.
///
/// Stored verbatim as received from the wallet provider. Use [`masked`]
/// for anything user-facing or logged - full addresses only go out on
/// provider API calls.
///
/// [`masked`]: WalletAddress::masked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Wrap a raw address string.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the full address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mask the middle of the address for display: a fixed-length prefix,
    /// an ellipsis, and a fixed-length suffix (e.g. `0xAb12...9fE3`).
    ///
    /// Addresses too short to meaningfully mask are returned unchanged.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= MASK_PREFIX_LEN + MASK_SUFFIX_LEN {
            return self.0.clone();
        }

        let prefix: String = chars.iter().take(MASK_PREFIX_LEN).collect();
        let suffix: String = chars
            .iter()
            .skip(chars.len() - MASK_SUFFIX_LEN)
            .collect();
        format!("{prefix}...{suffix}")
    }

    /// Whether the address is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl From<&str> for WalletAddress {
    fn from(address: &str) -> Self {
        Self(address.to_owned())
    }
}
