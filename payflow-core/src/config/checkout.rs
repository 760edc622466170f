use compact_str::CompactString;
use std::time::Duration;

use crate::checkout::CarrierDefaults;
use crate::pricing::DEFAULT_FIAT_CODE;
use crate::wallet::DEFAULT_FALLBACK_DELAY;

/// Checkout-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub fiat_code: CompactString,
    /// Label shown as the payee when a step carries none.
    pub recipient: String,
    /// How long the connector modal gets before the direct provider
    /// request is added.
    pub connect_fallback: Duration,
}

impl CheckoutConfig {
    /// Step defaults for this configuration.
    ///
    /// The demo amount and asset stay fixed; the fiat code and recipient
    /// follow the configuration.
    pub fn carrier_defaults(&self) -> CarrierDefaults {
        CarrierDefaults {
            recipient: self.recipient.clone(),
            fiat_code: self.fiat_code.clone(),
            ..CarrierDefaults::demo()
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            fiat_code: CompactString::const_new(DEFAULT_FIAT_CODE),
            recipient: CarrierDefaults::demo().recipient,
            connect_fallback: DEFAULT_FALLBACK_DELAY,
        }
    }
}
