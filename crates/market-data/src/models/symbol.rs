use serde::{Deserialize, Serialize};

/// A symbol split into its market prefix and short symbol.
///
/// `market_code` is empty when the symbol carried no `MARKET:` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolParts {
    pub market_code: String,
    pub short_symbol: String,
}

impl SymbolParts {
    pub fn new(market_code: impl Into<String>, short_symbol: impl Into<String>) -> Self {
        Self {
            market_code: market_code.into(),
            short_symbol: short_symbol.into(),
        }
    }

    pub fn has_market(&self) -> bool {
        !self.market_code.is_empty()
    }
}
