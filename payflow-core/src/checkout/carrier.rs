use compact_str::CompactString;
use payflow_sdk::objects::{
    Address, AssetSymbol, ChainId, CheckoutParams, PaymentIntent, PaymentMethod,
};
use tracing::debug;

use crate::pricing::DEFAULT_FIAT_CODE;

/// Values substituted for missing step parameters.
///
/// A step reached directly (a deep link, a manual test) carries no
/// parameters at all and renders with these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierDefaults {
    pub amount: String,
    pub asset: AssetSymbol,
    pub token_amount: String,
    pub recipient: String,
    pub chain: ChainId,
    pub fiat_code: CompactString,
}

impl CarrierDefaults {
    pub fn demo() -> Self {
        Self {
            amount: "250000".to_owned(),
            asset: AssetSymbol::Usdt,
            token_amount: "333.33".to_owned(),
            recipient: "Demo Merchant".to_owned(),
            chain: ChainId::ETHEREUM,
            fiat_code: CompactString::const_new(DEFAULT_FIAT_CODE),
        }
    }
}

impl Default for CarrierDefaults {
    fn default() -> Self {
        Self::demo()
    }
}

/// Converts a [`PaymentIntent`] to and from [`CheckoutParams`].
#[derive(Debug, Clone, Default)]
pub struct StateCarrier {
    defaults: CarrierDefaults,
}

impl StateCarrier {
    pub fn new(defaults: CarrierDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &CarrierDefaults {
        &self.defaults
    }

    /// One key per field. Values are carried as their display strings.
    pub fn serialize(&self, intent: &PaymentIntent) -> CheckoutParams {
        CheckoutParams {
            amount: Some(intent.fiat_amount.clone()),
            token: Some(intent.target_asset.to_string()),
            token_amount: intent.token_amount.clone(),
            recipient: Some(intent.recipient.clone()),
            wallet: intent.connected_address.as_ref().map(ToString::to_string),
            chain: intent.selected_chain.map(|chain| chain.to_string()),
            method: intent.selected_method.map(|method| method.as_str().to_owned()),
            currency: Some(intent.fiat_currency.to_string()),
        }
    }

    /// Rebuild an intent, substituting defaults for missing keys.
    ///
    /// Values that do not parse into their typed field fall back to the
    /// default as well. Nothing else is checked here; `tokenAmount` in
    /// particular is carried as-is and must be recomputed before use.
    pub fn deserialize(&self, params: &CheckoutParams) -> PaymentIntent {
        let d = &self.defaults;

        let target_asset = parse_or(params.token.as_deref(), d.asset, "token");
        let selected_chain = parse_or(params.chain.as_deref(), d.chain, "chain");
        let selected_method = params
            .method
            .as_deref()
            .and_then(|raw| raw.parse::<PaymentMethod>().ok());

        PaymentIntent {
            fiat_amount: params
                .amount
                .as_deref()
                .map(|amount| amount.replace(',', ""))
                .unwrap_or_else(|| d.amount.clone()),
            fiat_currency: params
                .currency
                .as_deref()
                .map(CompactString::from)
                .unwrap_or_else(|| d.fiat_code.clone()),
            target_asset,
            token_amount: Some(
                params
                    .token_amount
                    .clone()
                    .unwrap_or_else(|| d.token_amount.clone()),
            ),
            recipient: params
                .recipient
                .clone()
                .unwrap_or_else(|| d.recipient.clone()),
            selected_method,
            selected_chain: Some(selected_chain),
            connected_address: params.wallet.as_deref().map(Address::from),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T, key: &'static str) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            debug!(key, value = raw, "Unparseable step parameter, using default");
            default
        }),
    }
}
