//! Configuration module for payflow-server.
//!
//! Handles loading configuration from TOML files and CLI arguments, and
//! turns the file sections into the runtime rate table and chain catalog.

pub mod file;

use crate::config::file::FileConfig;
use compact_str::CompactString;
use payflow_core::catalog::{CatalogError, ChainCatalog, ReceivingWallet};
use payflow_core::config::{CheckoutConfig, ServerConfig, SharedConfig};
use payflow_core::pricing::{RateEntry, RateTable};
use payflow_sdk::objects::Address;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid wallet setup: {0}")]
    CatalogError(#[from] CatalogError),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub checkout: CheckoutConfig,
    pub rates: RateTable,
    pub catalog: ChainCatalog,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.checkout, self.rates, self.catalog)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the rate table and chain catalog
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        build_loaded_config(file_config)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.checkout.fiat_code.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "checkout.fiat_code must not be empty".to_owned(),
        ));
    }
    if config.checkout.fiat_per_usd <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "checkout.fiat_per_usd must be positive, got {}",
            config.checkout.fiat_per_usd
        )));
    }

    let mut seen = HashSet::new();
    for asset in &config.assets {
        if asset.usd_price < Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "asset {} has a negative usd_price",
                asset.symbol
            )));
        }
        if !seen.insert(asset.symbol) {
            return Err(ConfigError::ValidationError(format!(
                "asset {} is declared more than once",
                asset.symbol
            )));
        }
    }

    for wallet in &config.wallets {
        if wallet.enabled_assets.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "wallet {} has no enabled assets",
                wallet.address
            )));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let FileConfig {
        server,
        checkout,
        assets,
        wallets,
    } = file_config;

    let checkout_config = CheckoutConfig {
        fiat_code: CompactString::from(checkout.fiat_code.as_str()),
        recipient: checkout.recipient,
        connect_fallback: Duration::from_millis(checkout.connect_fallback_ms),
    };

    // Without any assets or wallets the built-in demo data is served.
    if assets.is_empty() && wallets.is_empty() {
        tracing::info!("No assets or wallets configured, using demo rates and addresses");
        let demo = RateTable::demo();
        return Ok(LoadedConfig {
            server: ServerConfig {
                listen: server.listen,
            },
            rates: RateTable::new(
                checkout_config.fiat_code.clone(),
                checkout.fiat_per_usd,
                demo.entries(),
            ),
            checkout: checkout_config,
            catalog: ChainCatalog::demo(),
        });
    }

    let rates = RateTable::new(
        checkout_config.fiat_code.clone(),
        checkout.fiat_per_usd,
        assets.iter().map(|asset| RateEntry {
            asset: asset.symbol,
            usd_price: asset.usd_price,
        }),
    );
    let catalog = ChainCatalog::new(
        wallets.into_iter().map(|wallet| ReceivingWallet {
            chain: wallet.chain,
            address: Address::from(wallet.address.as_str()),
            assets: wallet.enabled_assets,
        }),
        assets
            .iter()
            .map(|asset| (asset.symbol, asset.default_chain)),
    )?;

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: server.listen,
        },
        checkout: checkout_config,
        rates,
        catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use payflow_sdk::objects::{AssetSymbol, ChainId};
    use rust_decimal_macros::dec;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    fn load(toml_str: &str) -> Result<LoadedConfig, ConfigError> {
        let config = parse(toml_str);
        validate(&config)?;
        build_loaded_config(config)
    }

    const MINIMAL: &str = r#"
[checkout]
fiat_per_usd = "1600"

[[assets]]
symbol = "USDT"
usd_price = "1"
default_chain = "tron"

[[assets]]
symbol = "ETH"
usd_price = "3000"
default_chain = "1"

[[wallets]]
chain = "tron"
address = "TTron"
enabled_assets = ["USDT"]

[[wallets]]
chain = "1"
address = "0xeth"
enabled_assets = ["USDT", "ETH"]
"#;

    #[test]
    fn test_builds_rates_and_catalog() {
        let loaded = load(MINIMAL).unwrap();
        assert_eq!(loaded.rates.fiat_per_usd(), dec!(1600));
        assert_eq!(loaded.rates.usd_price(AssetSymbol::Eth), Some(dec!(3000)));
        assert_eq!(loaded.rates.usd_price(AssetSymbol::Btc), None);
        assert_eq!(
            loaded.catalog.default_chain(AssetSymbol::Usdt),
            Some(ChainId::Tron)
        );
        assert_eq!(
            loaded
                .catalog
                .address(AssetSymbol::Usdt, ChainId::ETHEREUM)
                .map(|a| a.as_str()),
            Some("0xeth")
        );
        assert_eq!(loaded.checkout.connect_fallback, Duration::from_millis(3000));
    }

    #[test]
    fn test_empty_file_serves_demo_data() {
        let loaded = load("").unwrap();
        assert_eq!(loaded.catalog, ChainCatalog::demo());
        assert_eq!(loaded.rates.usd_price(AssetSymbol::Btc), Some(dec!(65000)));
    }

    #[test]
    fn test_wallet_without_assets_is_rejected() {
        let toml_str = format!(
            "{MINIMAL}\n[[wallets]]\nchain = \"56\"\naddress = \"0xbsc\"\nenabled_assets = []\n"
        );
        assert!(matches!(
            load(&toml_str),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_default_chain_needs_a_wallet() {
        let toml_str = MINIMAL.replace("default_chain = \"tron\"", "default_chain = \"137\"");
        assert!(matches!(
            load(&toml_str),
            Err(ConfigError::CatalogError(CatalogError::DefaultWithoutAddress { .. }))
        ));
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let toml_str = format!(
            "{MINIMAL}\n[[wallets]]\nchain = \"tron\"\naddress = \"TOther\"\nenabled_assets = [\"USDT\"]\n"
        );
        assert!(matches!(
            load(&toml_str),
            Err(ConfigError::CatalogError(CatalogError::DuplicatePair { .. }))
        ));
    }

    #[test]
    fn test_rate_validation() {
        let negative = MINIMAL.replace("usd_price = \"3000\"", "usd_price = \"-1\"");
        assert!(matches!(
            load(&negative),
            Err(ConfigError::ValidationError(_))
        ));

        let zero_fiat = MINIMAL.replace("fiat_per_usd = \"1600\"", "fiat_per_usd = \"0\"");
        assert!(matches!(
            load(&zero_fiat),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_listen_override() {
        let path = std::env::temp_dir().join(format!(
            "payflow-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, MINIMAL).unwrap();

        let listen: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();
        assert_eq!(loaded.server.listen, listen);

        std::fs::remove_file(&path).unwrap();
    }
}
