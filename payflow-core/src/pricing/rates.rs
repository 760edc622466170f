use compact_str::CompactString;
use itertools::Itertools;
use payflow_sdk::objects::AssetSymbol;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Fiat currency the checkout is denominated in.
pub const DEFAULT_FIAT_CODE: &str = "NGN";

/// Local fiat units per one USD.
pub fn default_fiat_per_usd() -> Decimal {
    Decimal::from(750)
}

/// One asset price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEntry {
    pub asset: AssetSymbol,
    /// USD value of one whole token.
    pub usd_price: Decimal,
}

impl RateEntry {
    /// Local fiat value of one whole token.
    pub fn fiat_unit_price(&self, fiat_per_usd: Decimal) -> Decimal {
        self.usd_price * fiat_per_usd
    }
}

/// Asset price lookup, read-only for the duration of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    fiat_code: CompactString,
    fiat_per_usd: Decimal,
    usd_prices: HashMap<AssetSymbol, Decimal>,
}

impl RateTable {
    /// Build a table. When an asset appears more than once, the last entry wins.
    pub fn new(
        fiat_code: impl Into<CompactString>,
        fiat_per_usd: Decimal,
        entries: impl IntoIterator<Item = RateEntry>,
    ) -> Self {
        Self {
            fiat_code: fiat_code.into(),
            fiat_per_usd,
            usd_prices: entries
                .into_iter()
                .map(|entry| (entry.asset, entry.usd_price))
                .collect(),
        }
    }

    /// The built-in demo prices.
    pub fn demo() -> Self {
        let prices = [
            (AssetSymbol::Usdt, Decimal::ONE),
            (AssetSymbol::Usdc, Decimal::ONE),
            (AssetSymbol::Dai, Decimal::ONE),
            (AssetSymbol::Eth, Decimal::from(3500)),
            (AssetSymbol::Bnb, Decimal::from(600)),
            (AssetSymbol::Btc, Decimal::from(65000)),
            (AssetSymbol::Sol, Decimal::from(150)),
            (AssetSymbol::Trx, Decimal::new(12, 2)),
        ];
        Self::new(
            DEFAULT_FIAT_CODE,
            default_fiat_per_usd(),
            prices
                .into_iter()
                .map(|(asset, usd_price)| RateEntry { asset, usd_price }),
        )
    }

    pub fn fiat_code(&self) -> &str {
        &self.fiat_code
    }

    pub fn fiat_per_usd(&self) -> Decimal {
        self.fiat_per_usd
    }

    /// USD price of one token, if the asset is listed.
    pub fn usd_price(&self, asset: AssetSymbol) -> Option<Decimal> {
        self.usd_prices.get(&asset).copied()
    }

    /// All entries, ordered by asset.
    pub fn entries(&self) -> Vec<RateEntry> {
        self.usd_prices
            .iter()
            .map(|(asset, usd_price)| RateEntry {
                asset: *asset,
                usd_price: *usd_price,
            })
            .sorted_by_key(|entry| entry.asset)
            .collect()
    }
}
