//! Physical shipping address with US-only validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The checkout provider only ships to US addresses.
    #[error("shipping is only available to US addresses (got country {0:?})")]
    UnsupportedCountry(String),

    /// US addresses require a state code.
    #[error("US addresses require a state")]
    MissingState,
}

/// A physical shipping address.
///
/// Only `country == "US"` is accepted, and US addresses must carry a state.
/// Validation runs before any order request leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name.
    pub name: String,
    /// Primary street line.
    pub line1: String,
    /// Secondary street line (apartment, suite).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// City.
    pub city: String,
    /// State or region code. Mandatory when `country` is "US".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: String,
    /// ISO country code. Only "US" passes validation.
    pub country: String,
}

impl ShippingAddress {
    /// Validate the address against shipping policy.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::UnsupportedCountry`] for non-US countries and
    /// [`AddressError::MissingState`] for US addresses without a state.
    pub fn validate(&self) -> Result<(), AddressError> {
        if !self.country.eq_ignore_ascii_case("US") {
            return Err(AddressError::UnsupportedCountry(self.country.clone()));
        }

        match &self.state {
            Some(state) if !state.trim().is_empty() => Ok(()),
            _ => Err(AddressError::MissingState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us_address() -> ShippingAddress {
        ShippingAddress {
            name: "Jordan Doe".to_owned(),
            line1: "1 Main St".to_owned(),
            line2: None,
            city: "Springfield".to_owned(),
            state: Some("IL".to_owned()),
            postal_code: "62701".to_owned(),
            country: "US".to_owned(),
        }
    }

    #[test]
    fn test_valid_us_address() {
        assert!(us_address().validate().is_ok());
    }

    #[test]
    fn test_lowercase_country_accepted() {
        let mut addr = us_address();
        addr.country = "us".to_owned();
        assert!(addr.validate().is_ok());
    }

    #[test]
    fn test_non_us_rejected() {
        let mut addr = us_address();
        addr.country = "CA".to_owned();
        assert_eq!(
            addr.validate(),
            Err(AddressError::UnsupportedCountry("CA".to_owned()))
        );
    }

    #[test]
    fn test_us_without_state_rejected() {
        let mut addr = us_address();
        addr.state = None;
        assert_eq!(addr.validate(), Err(AddressError::MissingState));
    }

    #[test]
    fn test_us_with_blank_state_rejected() {
        let mut addr = us_address();
        addr.state = Some("  ".to_owned());
        assert_eq!(addr.validate(), Err(AddressError::MissingState));
    }
}
