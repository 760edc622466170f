//! Shared types for Payflow, a fiat-to-crypto checkout flow.
//!
//! The `client` feature adds a typed HTTP client for the checkout service.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
