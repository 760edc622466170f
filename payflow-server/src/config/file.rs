//! TOML file configuration structures.
//!
//! These structs directly map to the `payflow-config.toml` file format.

use payflow_sdk::objects::{AssetSymbol, ChainId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Checkout section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Fiat currency code amounts are entered in.
    #[serde(default = "default_fiat_code")]
    pub fiat_code: String,
    /// Fiat units per one USD.
    #[serde(default = "payflow_core::pricing::default_fiat_per_usd")]
    pub fiat_per_usd: Decimal,
    /// Milliseconds the connector modal gets before the direct provider
    /// request is added.
    #[serde(default = "default_connect_fallback_ms")]
    pub connect_fallback_ms: u64,
    /// Payee label used when a step carries none.
    #[serde(default = "default_recipient")]
    pub recipient: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            fiat_code: default_fiat_code(),
            fiat_per_usd: payflow_core::pricing::default_fiat_per_usd(),
            connect_fallback_ms: default_connect_fallback_ms(),
            recipient: default_recipient(),
        }
    }
}

fn default_fiat_code() -> String {
    payflow_core::pricing::DEFAULT_FIAT_CODE.to_owned()
}

fn default_connect_fallback_ms() -> u64 {
    payflow_core::wallet::DEFAULT_FALLBACK_DELAY.as_millis() as u64
}

fn default_recipient() -> String {
    payflow_core::checkout::CarrierDefaults::demo().recipient
}

/// One `[[assets]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: AssetSymbol,
    /// USD value of one whole token. Quote it (`"0.12"`) to keep it exact.
    pub usd_price: Decimal,
    /// Network whose address is used when a requested pair is not offered.
    pub default_chain: ChainId,
}

/// One `[[wallets]]` entry: a receiving address on one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub chain: ChainId,
    pub address: String,
    /// Assets this address accepts.
    pub enabled_assets: Vec<AssetSymbol>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[checkout]
fiat_code = "NGN"
fiat_per_usd = "1500"
connect_fallback_ms = 5000
recipient = "Corner Shop"

[[assets]]
symbol = "USDT"
usd_price = "1"
default_chain = "tron"

[[assets]]
symbol = "TRX"
usd_price = "0.12"
default_chain = "tron"

[[wallets]]
chain = "tron"
address = "TyjP2WPBg8Y4ErK9pGSSxY6BVScJy9uUxc"
enabled_assets = ["USDT", "TRX"]

[[wallets]]
chain = "137"
address = "0xa4c123b1612dd272d1371c17149d439536b3216f"
enabled_assets = ["USDT"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.checkout.fiat_per_usd, dec!(1500));
        assert_eq!(config.checkout.connect_fallback_ms, 5000);
        assert_eq!(config.assets.len(), 2);
        assert_eq!(config.assets[1].usd_price, dec!(0.12));
        assert_eq!(config.assets[0].default_chain, ChainId::Tron);
        assert_eq!(config.wallets[1].chain, ChainId::POLYGON);
        assert_eq!(
            config.wallets[0].enabled_assets,
            vec![AssetSymbol::Usdt, AssetSymbol::Trx]
        );
    }

    #[test]
    fn test_sections_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.checkout.fiat_code, "NGN");
        assert_eq!(config.checkout.fiat_per_usd, dec!(750));
        assert_eq!(config.checkout.connect_fallback_ms, 3000);
        assert_eq!(config.checkout.recipient, "Demo Merchant");
        assert!(config.assets.is_empty());
    }

    #[test]
    fn test_unknown_asset_is_rejected() {
        let toml_str = r#"
[[assets]]
symbol = "DOGE"
usd_price = "0.1"
default_chain = "1"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
