//! Application state shared across all request handlers.

use payflow_core::checkout::CheckoutFlow;
use payflow_core::config::SharedConfig;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
}

impl AppState {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Checkout flow over the configuration as it is right now.
    pub async fn flow(&self) -> CheckoutFlow {
        self.config.checkout_flow().await
    }
}
