//! Settlement chain and currency enums.
//!
//! Both sets are closed: the checkout provider only settles on the chains
//! and tokens listed here, and the wire format uses their kebab-case names.

use serde::{Deserialize, Serialize};

/// Blockchain network used to move funds for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    /// Base mainnet - the default settlement chain.
    Base,
    /// Base Sepolia testnet.
    BaseSepolia,
    /// Polygon mainnet.
    Polygon,
    /// Ethereum mainnet.
    Ethereum,
}

impl Chain {
    /// The provider-facing identifier for this chain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::BaseSepolia => "base-sepolia",
            Self::Polygon => "polygon",
            Self::Ethereum => "ethereum",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settlement currency for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// USDC stable coin - the default settlement currency.
    Usdc,
    /// Native ether.
    Eth,
}

impl Currency {
    /// The provider-facing identifier for this currency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usdc => "usdc",
            Self::Eth => "eth",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_wire_names() {
        assert_eq!(
            serde_json::to_string(&Chain::Base).expect("serialize"),
            "\"base\""
        );
        assert_eq!(
            serde_json::to_string(&Chain::BaseSepolia).expect("serialize"),
            "\"base-sepolia\""
        );
        let chain: Chain = serde_json::from_str("\"polygon\"").expect("deserialize");
        assert_eq!(chain, Chain::Polygon);
    }

    #[test]
    fn test_currency_wire_names() {
        assert_eq!(
            serde_json::to_string(&Currency::Usdc).expect("serialize"),
            "\"usdc\""
        );
        let currency: Currency = serde_json::from_str("\"eth\"").expect("deserialize");
        assert_eq!(currency, Currency::Eth);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(Chain::Base.to_string(), "base");
        assert_eq!(Currency::Usdc.to_string(), "usdc");
    }
}
