use payflow_sdk::objects::{AssetSymbol, ChainId, CheckoutParams, PaymentIntent, PaymentMethod};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::carrier::StateCarrier;
use crate::catalog::{CatalogError, ChainCatalog, SettlementAddress};
use crate::pricing::ConversionEngine;
use crate::utils::amount_input::parse_fiat_amount;
use crate::wallet::{ConnectionError, ConnectionOrchestrator};

/// Input problems surfaced inline on the step that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter a valid amount (got {0:?})")]
    InvalidAmount(String),

    #[error("select an asset to pay with")]
    NoAssetSelected,

    #[error("this payment method is not available")]
    MethodDisabled,

    #[error("{asset} is not offered on {chain}")]
    ChainNotOffered { asset: AssetSymbol, chain: ChainId },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result of the "Continue" action on the method step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// Go on to settlement with this intent.
    Proceed(PaymentIntent),
    /// The wallet is still not connected; stay on the method step.
    NotConnected {
        intent: PaymentIntent,
        error: ConnectionError,
    },
}

/// An intent with its resolved receiving address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub intent: PaymentIntent,
    pub address: SettlementAddress,
}

/// Typed step transitions over a rate and catalog snapshot.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    engine: ConversionEngine,
    catalog: ChainCatalog,
    carrier: StateCarrier,
}

impl CheckoutFlow {
    pub fn new(engine: ConversionEngine, catalog: ChainCatalog, carrier: StateCarrier) -> Self {
        Self {
            engine,
            catalog,
            carrier,
        }
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &ChainCatalog {
        &self.catalog
    }

    pub fn carrier(&self) -> &StateCarrier {
        &self.carrier
    }

    /// Amount-entry step: create the intent.
    pub fn enter_amount(
        &self,
        raw_amount: &str,
        asset: Option<AssetSymbol>,
        recipient: &str,
    ) -> Result<PaymentIntent, ValidationError> {
        let asset = asset.ok_or(ValidationError::NoAssetSelected)?;
        let fiat = positive_amount(raw_amount)?;

        let intent = PaymentIntent {
            fiat_amount: fiat.to_string(),
            fiat_currency: self.engine.rates().fiat_code().into(),
            target_asset: asset,
            token_amount: self.token_amount(fiat, asset),
            recipient: recipient.to_owned(),
            selected_method: None,
            selected_chain: self.catalog.default_chain(asset),
            connected_address: None,
        };
        debug!(%asset, amount = %intent.fiat_amount, token_amount = ?intent.token_amount, "Amount entered");
        Ok(intent)
    }

    /// Method step.
    pub fn select_method(
        &self,
        intent: PaymentIntent,
        method: PaymentMethod,
    ) -> Result<PaymentIntent, ValidationError> {
        if method == PaymentMethod::Disabled {
            return Err(ValidationError::MethodDisabled);
        }
        Ok(intent.with_method(method))
    }

    /// Rebuild an intent from step parameters and recompute its token amount.
    pub fn restore(&self, params: &CheckoutParams) -> PaymentIntent {
        let intent = self.carrier.deserialize(params);
        let token_amount = parse_fiat_amount(&intent.fiat_amount)
            .and_then(|fiat| self.token_amount(fiat, intent.target_asset));
        if token_amount != intent.token_amount {
            debug!(
                carried = ?intent.token_amount,
                recomputed = ?token_amount,
                "Replacing carried token amount"
            );
        }
        PaymentIntent {
            fiat_currency: self.engine.rates().fiat_code().into(),
            ..intent.with_token_amount(token_amount)
        }
    }

    /// Like [`restore`](Self::restore), but rejects an intent whose amount
    /// does not parse.
    pub fn revalidate(&self, params: &CheckoutParams) -> Result<PaymentIntent, ValidationError> {
        let intent = self.restore(params);
        positive_amount(&intent.fiat_amount)?;
        Ok(intent)
    }

    /// Step parameters for `intent`.
    pub fn params(&self, intent: &PaymentIntent) -> CheckoutParams {
        self.carrier.serialize(intent)
    }

    /// "Continue" after choosing to connect a wallet.
    ///
    /// Proceeds with the captured address and network when connected;
    /// otherwise the connection entry point is invoked again.
    pub async fn continue_with_wallet(
        &self,
        intent: PaymentIntent,
        orchestrator: &ConnectionOrchestrator,
        cancel: CancellationToken,
    ) -> ContinueOutcome {
        if intent.selected_method != Some(PaymentMethod::ConnectWallet) {
            return ContinueOutcome::Proceed(intent);
        }

        let target = intent
            .selected_chain
            .unwrap_or(self.carrier.defaults().chain);
        match orchestrator.connect(target, cancel).await {
            Ok(connection) => {
                info!(address = %connection.address, chain = %connection.chain, "Continuing with connected wallet");
                ContinueOutcome::Proceed(intent.with_connection(connection.address, connection.chain))
            }
            Err(error) => ContinueOutcome::NotConnected { intent, error },
        }
    }

    /// Settlement step with an explicit network choice. Only networks
    /// offered for the intent's asset are accepted.
    pub fn select_chain(
        &self,
        intent: PaymentIntent,
        chain: ChainId,
    ) -> Result<Settlement, ValidationError> {
        let asset = intent.target_asset;
        if !self.catalog.is_offered(asset, chain) {
            return Err(ValidationError::ChainNotOffered { asset, chain });
        }
        let address = self.catalog.resolve_address(asset, chain)?;
        Ok(Settlement {
            intent: intent.with_chain(chain),
            address,
        })
    }

    /// Settlement step for whatever network the intent carries, falling
    /// back to the asset's default address when the pair is not offered.
    pub fn settlement(&self, intent: PaymentIntent) -> Result<Settlement, ValidationError> {
        let asset = intent.target_asset;
        let requested = intent
            .selected_chain
            .or_else(|| self.catalog.default_chain(asset))
            .unwrap_or(self.carrier.defaults().chain);
        let address = self.catalog.resolve_address(asset, requested)?;
        Ok(Settlement {
            intent: intent.with_chain(address.chain),
            address,
        })
    }

    fn token_amount(&self, fiat: Decimal, asset: AssetSymbol) -> Option<String> {
        self.engine
            .convert_decimal(fiat, asset)
            .ok()
            .map(|quote| quote.display)
    }
}

fn positive_amount(raw: &str) -> Result<Decimal, ValidationError> {
    parse_fiat_amount(raw)
        .filter(|amount| *amount > Decimal::ZERO)
        .ok_or_else(|| ValidationError::InvalidAmount(raw.to_owned()))
}
