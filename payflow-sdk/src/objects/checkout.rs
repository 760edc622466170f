//! Checkout API request and response types.
//!
//! These types are exchanged between the checkout frontend and the
//! server-rendered checkout service.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::assets::AssetSymbol;
use super::blockchains::{Address, ChainId, NetworkFamily};
use super::intent::{CheckoutParams, PaymentIntent, PaymentMethod};

/// One row of the rate table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRate {
    pub symbol: AssetSymbol,
    pub usd_price: rust_decimal::Decimal,
}

/// Request body for converting a fiat amount into a token amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Fiat amount, grouping separators allowed.
    pub amount: String,
    pub token: AssetSymbol,
}

/// Result of a conversion.
///
/// `token_amount` is `None` when the asset has no usable rate; clients
/// must render that as unavailable rather than zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub amount: String,
    pub currency: CompactString,
    pub token: AssetSymbol,
    pub token_amount: Option<String>,
}

/// Query parameters for listing settlement networks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainsQuery {
    pub token: AssetSymbol,
}

/// A settlement network offered for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOption {
    pub chain: ChainId,
    pub display_name: String,
    pub family: NetworkFamily,
    pub wallet_address: Address,
}

/// A restored or advanced checkout step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    pub intent: PaymentIntent,
    /// The parameter set for the next navigation.
    pub params: CheckoutParams,
    /// `params` rendered as a query string.
    pub query: String,
}

/// Request body for the method-selection step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectMethodRequest {
    #[serde(default)]
    pub params: CheckoutParams,
    pub method: PaymentMethod,
}

/// Receiving address resolved for the settlement step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub intent: PaymentIntent,
    pub chain: ChainId,
    pub wallet_address: Address,
    /// `true` when the requested pair had no address and the asset's
    /// default network address was used instead.
    pub is_default: bool,
}
