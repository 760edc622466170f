use payflow_sdk::objects::AssetSymbol;
use rust_decimal::Decimal;
use thiserror::Error;

use super::format::format_token_amount;
use super::rates::RateTable;
use crate::utils::amount_input::parse_fiat_amount;

/// Errors that can occur while converting a fiat amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The amount is not a non-negative decimal.
    #[error("invalid fiat amount: {0:?}")]
    InvalidAmount(String),

    /// The asset has no rate, or its rate is zero.
    #[error("no rate available for {0}")]
    RateUnavailable(AssetSymbol),

    /// The fiat-to-USD rate is zero.
    #[error("no USD rate available for {0}")]
    FiatRateUnavailable(String),
}

/// A computed token amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenQuote {
    pub asset: AssetSymbol,
    pub fiat_amount: Decimal,
    pub token_amount: Decimal,
    /// `token_amount` formatted with [`format_token_amount`].
    pub display: String,
}

/// Converts fiat amounts into token amounts against a [`RateTable`] snapshot.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    rates: RateTable,
}

impl ConversionEngine {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Convert `fiat_amount` (grouping separators allowed) into `asset`.
    ///
    /// `token = fiat / fiat_per_usd / usd_price(asset)`; formatting is applied
    /// to the result of the division, never to intermediate values.
    pub fn convert(
        &self,
        fiat_amount: &str,
        asset: AssetSymbol,
    ) -> Result<TokenQuote, ConversionError> {
        let fiat = parse_fiat_amount(fiat_amount)
            .ok_or_else(|| ConversionError::InvalidAmount(fiat_amount.to_owned()))?;
        self.convert_decimal(fiat, asset)
    }

    /// Same as [`convert`](Self::convert) for an already parsed amount.
    pub fn convert_decimal(
        &self,
        fiat: Decimal,
        asset: AssetSymbol,
    ) -> Result<TokenQuote, ConversionError> {
        if fiat < Decimal::ZERO {
            return Err(ConversionError::InvalidAmount(fiat.to_string()));
        }

        let usd = fiat
            .checked_div(self.rates.fiat_per_usd())
            .ok_or_else(|| {
                ConversionError::FiatRateUnavailable(self.rates.fiat_code().to_owned())
            })?;

        let token_amount = self
            .rates
            .usd_price(asset)
            .and_then(|price| usd.checked_div(price))
            .ok_or(ConversionError::RateUnavailable(asset))?;

        tracing::trace!(%asset, %fiat, %token_amount, "Converted fiat amount");

        Ok(TokenQuote {
            asset,
            fiat_amount: fiat,
            token_amount,
            display: format_token_amount(token_amount),
        })
    }

    /// The display string, or `None` when the amount is invalid or no rate
    /// is available.
    pub fn convert_display(&self, fiat_amount: &str, asset: AssetSymbol) -> Option<String> {
        self.convert(fiat_amount, asset).ok().map(|quote| quote.display)
    }
}
