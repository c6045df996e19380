//! Core types for Mintcart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod chain;
pub mod id;
pub mod wallet;

pub use address::{AddressError, ShippingAddress};
pub use chain::{Chain, Currency};
pub use id::*;
pub use wallet::WalletAddress;
