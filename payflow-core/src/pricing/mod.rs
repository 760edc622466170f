//! Fiat-to-token pricing.
//!
//! - [`RateTable`]: static asset prices for one checkout
//! - [`ConversionEngine`]: fiat amount to token amount, with display formatting
//! - [`format_token_amount`]: the precision tiers used on receipts

mod conversion;
mod format;
mod rates;

pub use conversion::{ConversionEngine, ConversionError, TokenQuote};
pub use format::format_token_amount;
pub use rates::{DEFAULT_FIAT_CODE, RateEntry, RateTable, default_fiat_per_usd};
