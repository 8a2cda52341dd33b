//! Provider registry module.
//!
//! - Provider registration and market-code indexing
//! - Asset-type default routing (ISIN / MIC / generic slots)
//! - Market-code conflict reporting

mod default_routes;
mod provider_registry;

pub use default_routes::{
    DefaultRoute, DefaultRoutes, RouteSlot, BINANCE_PROVIDER_ID, CME_PROVIDER_ID,
    COINBASE_PROVIDER_ID, FIXER_PROVIDER_ID, YAHOO_PROVIDER_ID,
};
pub use provider_registry::{MarketConflict, ProviderRegistry};
