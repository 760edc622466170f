//! The payment intent and its flat step-boundary representation.
//!
//! A [`PaymentIntent`] is the single record threaded through the checkout
//! steps. Between steps it travels as [`CheckoutParams`], a flat set of
//! optional string keys that can be rendered into (and parsed back from)
//! a URL query string.

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::assets::AssetSymbol;
use super::blockchains::{Address, ChainId};

/// How the payer intends to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Payer sends manually from any wallet to the displayed address.
    SendFromWallet,
    /// Payer connects an injected browser wallet.
    ConnectWallet,
    /// Payer is redirected to a wallet app through a deep link.
    AppRedirect,
    /// Listed but not selectable.
    Disabled,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::SendFromWallet => "send-from-wallet",
            PaymentMethod::ConnectWallet => "connect-wallet",
            PaymentMethod::AppRedirect => "app-redirect",
            PaymentMethod::Disabled => "disabled",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "send-from-wallet" => Ok(PaymentMethod::SendFromWallet),
            "connect-wallet" => Ok(PaymentMethod::ConnectWallet),
            "app-redirect" => Ok(PaymentMethod::AppRedirect),
            "disabled" => Ok(PaymentMethod::Disabled),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}

/// The record describing what is being paid, in what asset, and via what
/// method, network and address.
///
/// Each step produces a new value through the `with_*` methods instead of
/// mutating the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Fiat amount, comma-free.
    pub fiat_amount: String,
    pub fiat_currency: CompactString,
    pub target_asset: AssetSymbol,
    /// Display string derived from `fiat_amount` and `target_asset`.
    /// `None` when no conversion is available.
    pub token_amount: Option<String>,
    pub recipient: String,
    pub selected_method: Option<PaymentMethod>,
    pub selected_chain: Option<ChainId>,
    pub connected_address: Option<Address>,
}

impl PaymentIntent {
    pub fn with_token_amount(self, token_amount: Option<String>) -> Self {
        Self {
            token_amount,
            ..self
        }
    }

    pub fn with_method(self, method: PaymentMethod) -> Self {
        Self {
            selected_method: Some(method),
            ..self
        }
    }

    pub fn with_chain(self, chain: ChainId) -> Self {
        Self {
            selected_chain: Some(chain),
            ..self
        }
    }

    /// Record a connected wallet and the network it reported.
    pub fn with_connection(self, address: Address, chain: ChainId) -> Self {
        Self {
            connected_address: Some(address),
            selected_chain: Some(chain),
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Step boundary
// ---------------------------------------------------------------------------

/// Flat key-value form of a [`PaymentIntent`] carried between steps.
///
/// Every field is optional: a step reached through a deep link may carry
/// any subset, including none at all. An empty value counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutParams {
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub token_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

impl CheckoutParams {
    /// Render as a query string without the leading `?`. Absent keys are omitted.
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// Unknown keys are ignored. A repeated key is an error.
    pub fn from_query_string(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(query.strip_prefix('?').unwrap_or(query))
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        let params = CheckoutParams {
            amount: Some("250000".into()),
            token: Some("USDT".into()),
            recipient: Some("Ada & Co".into()),
            chain: Some("tron".into()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query_string().unwrap(),
            "amount=250000&token=USDT&recipient=Ada+%26+Co&chain=tron"
        );
        assert_eq!(CheckoutParams::default().to_query_string().unwrap(), "");
    }

    #[test]
    fn test_query_string_decoding() {
        let params = CheckoutParams::from_query_string(
            "?amount=1000&recipient=Ada+Lovelace&foo=bar&wallet=&tokenAmount=1%2C000.5",
        )
        .unwrap();
        assert_eq!(params.amount.as_deref(), Some("1000"));
        assert_eq!(params.recipient.as_deref(), Some("Ada Lovelace"));
        assert_eq!(params.token_amount.as_deref(), Some("1,000.5"));
        assert_eq!(params.wallet, None);
        assert_eq!(params.token, None);
    }

    #[test]
    fn test_query_string_with_reserved_characters() {
        let params = CheckoutParams {
            recipient: Some("Café = 50% off?".into()),
            ..Default::default()
        };
        let query = params.to_query_string().unwrap();
        assert_eq!(CheckoutParams::from_query_string(&query).unwrap(), params);
    }

    #[test]
    fn test_repeated_key_is_rejected() {
        assert!(CheckoutParams::from_query_string("amount=1&amount=2").is_err());
    }

    #[test]
    fn test_empty_query_string() {
        assert!(CheckoutParams::from_query_string("").unwrap().is_empty());
        assert!(CheckoutParams::from_query_string("?").unwrap().is_empty());
    }

    #[test]
    fn test_empty_json_value_counts_as_absent() {
        let params: CheckoutParams =
            serde_json::from_str(r#"{"amount": "", "token": "USDC"}"#).unwrap();
        assert_eq!(params.amount, None);
        assert_eq!(params.token.as_deref(), Some("USDC"));
    }

    #[test]
    fn test_params_json_uses_boundary_keys() {
        let params = CheckoutParams {
            token_amount: Some("333.33".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"tokenAmount":"333.33"}"#);
    }

    #[test]
    fn test_payment_method_round_trip_names() {
        for method in [
            PaymentMethod::SendFromWallet,
            PaymentMethod::ConnectWallet,
            PaymentMethod::AppRedirect,
            PaymentMethod::Disabled,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
