use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// All assets a payer can settle in
#[serde(rename_all = "UPPERCASE")]
pub enum AssetSymbol {
    Usdt,
    Usdc,
    Dai,
    Eth,
    Bnb,
    Btc,
    Sol,
    Trx,
}

impl AssetSymbol {
    pub const ALL: [AssetSymbol; 8] = [
        AssetSymbol::Usdt,
        AssetSymbol::Usdc,
        AssetSymbol::Dai,
        AssetSymbol::Eth,
        AssetSymbol::Bnb,
        AssetSymbol::Btc,
        AssetSymbol::Sol,
        AssetSymbol::Trx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetSymbol::Usdt => "USDT",
            AssetSymbol::Usdc => "USDC",
            AssetSymbol::Dai => "DAI",
            AssetSymbol::Eth => "ETH",
            AssetSymbol::Bnb => "BNB",
            AssetSymbol::Btc => "BTC",
            AssetSymbol::Sol => "SOL",
            AssetSymbol::Trx => "TRX",
        }
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset symbol: {0}")]
pub struct UnknownAsset(pub String);

impl FromStr for AssetSymbol {
    type Err = UnknownAsset;

    /// Symbols are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetSymbol::ALL
            .into_iter()
            .find(|asset| asset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAsset(s.to_owned()))
    }
}
