use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Asset classes a quote can be requested for.
///
/// Drives both the default-provider routing and which provider
/// capability is invoked for a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetType {
    Stock,
    Bond,
    Commodity,
    Cryptocurrency,
    Forex,
    MutualFund,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::Stock,
        AssetType::Bond,
        AssetType::Commodity,
        AssetType::Cryptocurrency,
        AssetType::Forex,
        AssetType::MutualFund,
    ];

    /// Upper-case key used in configuration variables (e.g. `QF_ROUTE_CRYPTO`).
    pub fn config_key(&self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Bond => "BOND",
            AssetType::Commodity => "COMMODITY",
            AssetType::Cryptocurrency => "CRYPTO",
            AssetType::Forex => "FOREX",
            AssetType::MutualFund => "MUTUALFUND",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetType::Stock => "Stock",
            AssetType::Bond => "Bond",
            AssetType::Commodity => "Commodity",
            AssetType::Cryptocurrency => "Cryptocurrency",
            AssetType::Forex => "Forex",
            AssetType::MutualFund => "MutualFund",
        };
        f.write_str(name)
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(AssetType::Stock),
            "bond" => Ok(AssetType::Bond),
            "commodity" => Ok(AssetType::Commodity),
            "crypto" | "cryptocurrency" => Ok(AssetType::Cryptocurrency),
            "forex" | "fx" => Ok(AssetType::Forex),
            "mutualfund" | "mutual_fund" | "fund" => Ok(AssetType::MutualFund),
            other => Err(format!("Unknown asset type: {}", other)),
        }
    }
}
