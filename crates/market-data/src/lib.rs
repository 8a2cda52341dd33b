//! Quotefeed Market Data Crate
//!
//! This crate answers "what is the current price of X" for batches of
//! ticker-like symbols by routing them to upstream quote providers.
//!
//! # Overview
//!
//! - Symbol parsing and validation (`MARKET:SHORT` notation)
//! - Provider selection by market code, with per-asset-type default routes
//! - One batched call per provider, all providers queried concurrently
//! - Shared TTL cache with a shorter lifetime for unresolvable symbols
//! - Minor-unit currency normalization (GBp -> GBP)
//! - Partial-failure reporting per provider
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  QuoteAggregator |  get_quotes(symbols, asset_type)
//! +------------------+
//!     |         |         \
//!     v         v          v
//! +--------+ +----------+ +------------+
//! |resolver| | registry | | QuoteCache |
//! +--------+ +----------+ +------------+
//!               |
//!               v
//!        +---------------+
//!        | QuoteProvider |  (Yahoo, Binance, Coinbase, CME, Fixer)
//!        +---------------+
//! ```
//!
//! # Core Types
//!
//! - [`Asset`] - Uniform quote record (`symbol`, `price`, `currency`)
//! - [`AssetType`] - Closed set of asset classes
//! - [`SymbolParts`] - Parsed market code and short symbol
//! - [`QuoteBatch`] - Quotes plus per-provider failures for one request
//! - [`QuoteError`] - Error taxonomy shared by all components

pub mod aggregator;
pub mod cache;
pub mod currency;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;

// Re-export all public types from models
pub use models::{Asset, AssetType, ProviderId, SymbolParts};

pub use errors::QuoteError;

pub use resolver::{is_valid_isin, is_valid_mic, normalize_symbol, parse_symbol};

// Re-export provider types
pub use provider::binance::BinanceProvider;
pub use provider::cme::CmeProvider;
pub use provider::coinbase::CoinbaseProvider;
pub use provider::fixer::FixerProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{ProviderCapabilities, QuoteProvider};

// Re-export registry types
pub use registry::{DefaultRoute, DefaultRoutes, MarketConflict, ProviderRegistry, RouteSlot};

pub use cache::{CacheStats, CacheTtl, QuoteCache};

pub use aggregator::{BatchStats, FailurePolicy, ProviderFailure, QuoteAggregator, QuoteBatch};
