//! Mintcart Core - Shared types library.
//!
//! This crate provides common types used across all Mintcart components:
//! - `gateway` - Webhook/API server and order-payment orchestration
//! - future bot and web-app crates
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, wallet addresses,
//!   settlement chains/currencies, and shipping addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
