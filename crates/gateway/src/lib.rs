//! Mintcart Gateway library.
//!
//! This crate provides the gateway functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod crossmint;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
