//! Settlement networks and receiving addresses.
//!
//! The catalog is built from receiving wallets (one address per network,
//! with the assets it accepts) plus a default network per asset. A pair
//! `(asset, chain)` is offered only if a wallet on `chain` accepts `asset`,
//! so every offered pair resolves to exactly one address.

use compact_str::{CompactString, format_compact};
use itertools::Itertools;
use payflow_sdk::objects::{Address, AssetSymbol, ChainId, NetworkFamily};
use smallvec::SmallVec;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building or querying a [`ChainCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{asset} on chain {chain} is declared by more than one wallet")]
    DuplicatePair { asset: AssetSymbol, chain: ChainId },

    #[error("{0} has receiving wallets but no default chain")]
    MissingDefault(AssetSymbol),

    #[error("default chain {chain} for {asset} has no wallet accepting it")]
    DefaultWithoutAddress { asset: AssetSymbol, chain: ChainId },

    #[error("{0} is not offered by any settlement network")]
    AssetNotOffered(AssetSymbol),
}

/// A wallet that receives payments on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivingWallet {
    pub chain: ChainId,
    pub address: Address,
    pub assets: Vec<AssetSymbol>,
}

/// A settlement network as shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub chain_id: ChainId,
    pub display_name: String,
    pub asset_support: SmallVec<[AssetSymbol; 4]>,
}

impl ChainDescriptor {
    pub fn family(&self) -> NetworkFamily {
        self.chain_id.family()
    }

    pub fn supports(&self, asset: AssetSymbol) -> bool {
        self.asset_support.contains(&asset)
    }
}

/// The receiving address picked for a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementAddress {
    pub asset: AssetSymbol,
    /// The network `address` lives on. Differs from the requested chain
    /// when `is_default` is set.
    pub chain: ChainId,
    pub address: Address,
    pub is_default: bool,
}

/// Human-readable name of a network.
pub fn display_name(chain: ChainId) -> String {
    match chain {
        ChainId::ETHEREUM => "Ethereum".to_owned(),
        ChainId::BNB_SMART_CHAIN => "BNB Smart Chain".to_owned(),
        ChainId::POLYGON => "Polygon".to_owned(),
        ChainId::BASE => "Base".to_owned(),
        ChainId::ARBITRUM_ONE => "Arbitrum One".to_owned(),
        ChainId::Evm(id) => format!("EVM chain {id}"),
        ChainId::Tron => "Tron".to_owned(),
        ChainId::Solana => "Solana".to_owned(),
        ChainId::Bitcoin => "Bitcoin".to_owned(),
    }
}

/// Lookup key for a receiving address: `"{asset}-{chain}"`, e.g. `"USDT-tron"`.
pub fn composite_key(asset: AssetSymbol, chain: ChainId) -> CompactString {
    format_compact!("{asset}-{chain}")
}

/// Addresses of the built-in demo catalog.
pub mod demo {
    pub const EVM_ADDRESS: &str = "0xa4c123b1612dd272d1371c17149d439536b3216f";
    pub const TRON_ADDRESS: &str = "TyjP2WPBg8Y4ErK9pGSSxY6BVScJy9uUxc";
    pub const SOLANA_ADDRESS: &str = "JnTPkyRFA6CAFjF1YveCHK1ATbQgdM9mwZgikp4Wzxrx";
    pub const BITCOIN_ADDRESS: &str = "bc1qeeeex7ervydu284rxqfxhpydcfskh788la77n9";
}

/// Settlement networks and their receiving addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCatalog {
    chains: Vec<ChainDescriptor>,
    addresses: HashMap<CompactString, Address>,
    defaults: HashMap<AssetSymbol, ChainId>,
}

impl ChainCatalog {
    /// Build a catalog from receiving wallets and per-asset default chains.
    ///
    /// Networks keep the order of their first wallet.
    pub fn new(
        wallets: impl IntoIterator<Item = ReceivingWallet>,
        defaults: impl IntoIterator<Item = (AssetSymbol, ChainId)>,
    ) -> Result<Self, CatalogError> {
        let mut chains: Vec<ChainDescriptor> = Vec::new();
        let mut addresses = HashMap::new();

        for wallet in wallets {
            let index = match chains.iter().position(|c| c.chain_id == wallet.chain) {
                Some(index) => index,
                None => {
                    chains.push(ChainDescriptor {
                        chain_id: wallet.chain,
                        display_name: display_name(wallet.chain),
                        asset_support: SmallVec::new(),
                    });
                    chains.len() - 1
                }
            };

            for asset in wallet.assets.iter().copied().unique() {
                let key = composite_key(asset, wallet.chain);
                if addresses.insert(key, wallet.address.clone()).is_some() {
                    return Err(CatalogError::DuplicatePair {
                        asset,
                        chain: wallet.chain,
                    });
                }
                chains[index].asset_support.push(asset);
            }
        }

        let defaults: HashMap<AssetSymbol, ChainId> = defaults.into_iter().collect();
        for (asset, chain) in &defaults {
            if !addresses.contains_key(&composite_key(*asset, *chain)) {
                return Err(CatalogError::DefaultWithoutAddress {
                    asset: *asset,
                    chain: *chain,
                });
            }
        }
        if let Some(asset) = chains
            .iter()
            .flat_map(|c| c.asset_support.iter().copied())
            .find(|asset| !defaults.contains_key(asset))
        {
            return Err(CatalogError::MissingDefault(asset));
        }

        Ok(Self {
            chains,
            addresses,
            defaults,
        })
    }

    /// The built-in demo catalog.
    #[allow(clippy::expect_used)]
    pub fn demo() -> Self {
        use AssetSymbol::*;

        let evm = Address::from(demo::EVM_ADDRESS);
        let wallets = [
            (ChainId::ETHEREUM, evm.clone(), vec![Usdt, Usdc, Dai, Eth]),
            (ChainId::BNB_SMART_CHAIN, evm.clone(), vec![Usdt, Usdc, Bnb]),
            (ChainId::POLYGON, evm.clone(), vec![Usdt, Usdc]),
            (ChainId::BASE, evm, vec![Usdc, Eth]),
            (ChainId::Tron, Address::from(demo::TRON_ADDRESS), vec![Usdt, Trx]),
            (ChainId::Solana, Address::from(demo::SOLANA_ADDRESS), vec![Usdc, Sol]),
            (ChainId::Bitcoin, Address::from(demo::BITCOIN_ADDRESS), vec![Btc]),
        ]
        .into_iter()
        .map(|(chain, address, assets)| ReceivingWallet {
            chain,
            address,
            assets,
        });
        let defaults = [
            (Usdt, ChainId::Tron),
            (Usdc, ChainId::ETHEREUM),
            (Dai, ChainId::ETHEREUM),
            (Eth, ChainId::ETHEREUM),
            (Bnb, ChainId::BNB_SMART_CHAIN),
            (Trx, ChainId::Tron),
            (Sol, ChainId::Solana),
            (Btc, ChainId::Bitcoin),
        ];

        Self::new(wallets, defaults).expect("demo catalog is consistent")
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    pub fn chain(&self, chain: ChainId) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.chain_id == chain)
    }

    /// Networks on which `asset` can be paid.
    pub fn chains_for(&self, asset: AssetSymbol) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter().filter(move |c| c.supports(asset))
    }

    pub fn is_offered(&self, asset: AssetSymbol, chain: ChainId) -> bool {
        self.addresses.contains_key(&composite_key(asset, chain))
    }

    /// The default network for `asset`.
    pub fn default_chain(&self, asset: AssetSymbol) -> Option<ChainId> {
        self.defaults.get(&asset).copied()
    }

    /// Address for an offered pair only, without default fallback.
    pub fn address(&self, asset: AssetSymbol, chain: ChainId) -> Option<&Address> {
        self.addresses.get(&composite_key(asset, chain))
    }

    /// Resolve the receiving address for `asset` on `chain`.
    ///
    /// When the pair is not offered, the address on the asset's default
    /// chain is returned with `is_default` set. Fails only for an asset no
    /// network accepts.
    pub fn resolve_address(
        &self,
        asset: AssetSymbol,
        chain: ChainId,
    ) -> Result<SettlementAddress, CatalogError> {
        if let Some(address) = self.address(asset, chain) {
            return Ok(SettlementAddress {
                asset,
                chain,
                address: address.clone(),
                is_default: false,
            });
        }

        let default_chain = self
            .default_chain(asset)
            .ok_or(CatalogError::AssetNotOffered(asset))?;
        let address = self
            .address(asset, default_chain)
            .ok_or(CatalogError::AssetNotOffered(asset))?;
        tracing::debug!(
            %asset,
            requested = %chain,
            fallback = %default_chain,
            "Pair not offered, using default receiving address"
        );
        Ok(SettlementAddress {
            asset,
            chain: default_chain,
            address: address.clone(),
            is_default: true,
        })
    }
}
