#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod pricing;
pub mod utils;
pub mod wallet;
