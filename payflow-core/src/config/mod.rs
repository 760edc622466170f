//! Configuration types for the checkout.
//!
//! These types represent the validated runtime configuration used by the
//! server. Loading and parsing is handled by the server crate.

mod checkout;
mod server;

pub use checkout::CheckoutConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::ChainCatalog;
use crate::checkout::{CheckoutFlow, StateCarrier};
use crate::pricing::{ConversionEngine, RateTable};
use crate::wallet::{ConnectionOrchestrator, SharedConnection, WalletProviderAdapter};

/// Shared configuration state with separate locks for each section.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Fiat denomination, recipient label and connection timing.
    pub checkout: Arc<RwLock<CheckoutConfig>>,
    /// Asset prices.
    pub rates: Arc<RwLock<RateTable>>,
    /// Settlement networks and receiving addresses.
    pub catalog: Arc<RwLock<ChainCatalog>>,
}

impl SharedConfig {
    pub fn new(
        server: ServerConfig,
        checkout: CheckoutConfig,
        rates: RateTable,
        catalog: ChainCatalog,
    ) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            checkout: Arc::new(RwLock::new(checkout)),
            rates: Arc::new(RwLock::new(rates)),
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Built-in demo rates and catalog on the default listen address.
    pub fn demo() -> Self {
        Self::new(
            ServerConfig::default(),
            CheckoutConfig::default(),
            RateTable::demo(),
            ChainCatalog::demo(),
        )
    }

    /// A [`CheckoutFlow`] over a snapshot of the current sections.
    ///
    /// A request keeps working against its snapshot even if a reload
    /// happens meanwhile.
    pub async fn checkout_flow(&self) -> CheckoutFlow {
        let checkout = self.checkout.read().await;
        let rates = self.rates.read().await.clone();
        let catalog = self.catalog.read().await.clone();
        CheckoutFlow::new(
            ConversionEngine::new(rates),
            catalog,
            StateCarrier::new(checkout.carrier_defaults()),
        )
    }

    /// A connection orchestrator using the configured fallback delay.
    pub async fn connection_orchestrator(
        &self,
        adapter: WalletProviderAdapter,
        shared: SharedConnection,
    ) -> ConnectionOrchestrator {
        let delay = self.checkout.read().await.connect_fallback;
        ConnectionOrchestrator::new(adapter, shared).with_fallback_delay(delay)
    }
}
