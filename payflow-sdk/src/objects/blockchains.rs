use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The family a settlement network belongs to.
///
/// Only [`NetworkFamily::Evm`] networks can be reached through an injected
/// EIP-1193 provider; the others are listed in the chain catalog as
/// send-from-wallet destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkFamily {
    Evm,
    Tron,
    Solana,
    Bitcoin,
}

impl NetworkFamily {
    pub fn is_evm(&self) -> bool {
        matches!(self, NetworkFamily::Evm)
    }
}

impl fmt::Display for NetworkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFamily::Evm => f.write_str("evm"),
            NetworkFamily::Tron => f.write_str("tron"),
            NetworkFamily::Solana => f.write_str("solana"),
            NetworkFamily::Bitcoin => f.write_str("bitcoin"),
        }
    }
}

/// Identifier of a settlement network.
///
/// On the wire an EVM chain is its decimal chain id (`"1"`, `"137"`), the
/// other families are their lower-case name (`"tron"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainId {
    Evm(u64),
    Tron,
    Solana,
    Bitcoin,
}

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId::Evm(1);
    pub const BNB_SMART_CHAIN: ChainId = ChainId::Evm(56);
    pub const POLYGON: ChainId = ChainId::Evm(137);
    pub const BASE: ChainId = ChainId::Evm(8453);
    pub const ARBITRUM_ONE: ChainId = ChainId::Evm(42161);

    pub fn family(&self) -> NetworkFamily {
        match self {
            ChainId::Evm(_) => NetworkFamily::Evm,
            ChainId::Tron => NetworkFamily::Tron,
            ChainId::Solana => NetworkFamily::Solana,
            ChainId::Bitcoin => NetworkFamily::Bitcoin,
        }
    }

    /// The `0x`-prefixed form used by `eth_chainId` and `wallet_switchEthereumChain`.
    pub fn to_hex(&self) -> Option<String> {
        match self {
            ChainId::Evm(id) => Some(format!("{id:#x}")),
            _ => None,
        }
    }
}

impl Default for ChainId {
    fn default() -> Self {
        ChainId::ETHEREUM
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Evm(id) => write!(f, "{id}"),
            ChainId::Tron => f.write_str("tron"),
            ChainId::Solana => f.write_str("solana"),
            ChainId::Bitcoin => f.write_str("bitcoin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chain id: {0}")]
pub struct InvalidChainId(pub String);

impl FromStr for ChainId {
    type Err = InvalidChainId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || InvalidChainId(s.to_owned());
        match trimmed.to_ascii_lowercase().as_str() {
            "tron" => Ok(ChainId::Tron),
            "solana" => Ok(ChainId::Solana),
            "bitcoin" => Ok(ChainId::Bitcoin),
            lower => {
                let id = match lower.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid())?,
                    None => lower.parse::<u64>().map_err(|_| invalid())?,
                };
                Ok(ChainId::Evm(id))
            }
        }
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A receiving or payer wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub CompactString);

impl Address {
    pub fn new(address: impl Into<CompactString>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(CompactString::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_parsing() {
        assert_eq!("1".parse::<ChainId>().unwrap(), ChainId::ETHEREUM);
        assert_eq!("0x89".parse::<ChainId>().unwrap(), ChainId::POLYGON);
        assert_eq!("TRON".parse::<ChainId>().unwrap(), ChainId::Tron);
        assert!("mainnet".parse::<ChainId>().is_err());
        assert!("0xzz".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_chain_id_wire_format() {
        assert_eq!(ChainId::BASE.to_string(), "8453");
        assert_eq!(ChainId::Solana.to_string(), "solana");
        assert_eq!(ChainId::POLYGON.to_hex().as_deref(), Some("0x89"));
        assert_eq!(ChainId::Bitcoin.to_hex(), None);

        let json = serde_json::to_string(&ChainId::ARBITRUM_ONE).unwrap();
        assert_eq!(json, "\"42161\"");
        let parsed: ChainId = serde_json::from_str("\"tron\"").unwrap();
        assert_eq!(parsed, ChainId::Tron);
    }

    #[test]
    fn test_family() {
        assert!(ChainId::BNB_SMART_CHAIN.family().is_evm());
        assert_eq!(ChainId::Tron.family(), NetworkFamily::Tron);
        assert!(!ChainId::Bitcoin.family().is_evm());
    }
}
