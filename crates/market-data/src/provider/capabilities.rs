//! Provider capability description.
//!
//! Used by the registry to index market codes and by adapters to reject
//! asset types they cannot quote.

use crate::models::AssetType;

/// Describes what a quote provider can do.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Asset types this provider can quote.
    pub asset_types: &'static [AssetType],

    /// Market codes this provider owns (e.g. "XLON", "BINANCE").
    /// A symbol prefixed with one of these is always routed here.
    pub markets: Vec<&'static str>,
}

impl ProviderCapabilities {
    pub fn supports(&self, asset_type: AssetType) -> bool {
        self.asset_types.contains(&asset_type)
    }
}
