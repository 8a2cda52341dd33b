//! Quote data models
//!
//! - `types` - Type alias for provider identifiers (ProviderId)
//! - `asset` - The uniform quote record returned to callers (Asset)
//! - `asset_type` - Closed set of asset classes (AssetType)
//! - `symbol` - Parsed `MARKET:SHORT` symbol (SymbolParts)

mod asset;
mod asset_type;
mod symbol;
mod types;

pub use asset::Asset;
pub use asset_type::AssetType;
pub use symbol::SymbolParts;
pub use types::ProviderId;
