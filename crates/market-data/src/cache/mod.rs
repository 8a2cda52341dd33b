//! Quote caching.

mod quote_cache;

pub use quote_cache::{
    CacheStats, CacheTtl, QuoteCache, DEFAULT_CAPACITY, DEFAULT_TTL, INVALID_TTL,
};
