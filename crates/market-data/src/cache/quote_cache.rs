//! In-memory quote cache with per-entry TTL using moka

use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

use crate::models::Asset;

/// Default lifetime of a priced quote (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
/// Default lifetime of a quote without a price (5 minutes)
pub const INVALID_TTL: Duration = Duration::from_secs(300);
/// Default maximum number of cached quotes
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// TTL classes for cached quotes.
///
/// Priced quotes live for `valid`; quotes without a price live for the much
/// shorter `invalid` so an unresolvable symbol is retried soon, but not on
/// every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheTtl {
    pub valid: Duration,
    pub invalid: Duration,
}

impl CacheTtl {
    pub fn new(valid: Duration, invalid: Duration) -> Self {
        Self { valid, invalid }
    }

    /// TTL class for a quote.
    pub fn for_asset(&self, asset: &Asset) -> Duration {
        if asset.has_price() {
            self.valid
        } else {
            self.invalid
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, INVALID_TTL)
    }
}

#[derive(Clone, Debug)]
struct CachedAsset {
    asset: Asset,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
/// Overwriting an entry restarts its clock with the new TTL.
struct PerEntryTtl;

impl Expiry<String, CachedAsset> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedAsset,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedAsset,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Shared quote cache keyed by `"{providerId}_{shortSymbol}"`.
///
/// Safe for concurrent readers and writers; racing writers to one key
/// resolve last-writer-wins. Expired entries are never returned.
pub struct QuoteCache {
    cache: Cache<String, CachedAsset>,
}

impl QuoteCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Cache key for a quote served by `provider_id`.
    pub fn key(provider_id: &str, short_symbol: &str) -> String {
        format!("{}_{}", provider_id, short_symbol)
    }

    /// Get a live quote from cache
    pub async fn get(&self, key: &str) -> Option<Asset> {
        self.cache.get(key).await.map(|entry| entry.asset)
    }

    /// Store a quote, replacing any previous entry for the key
    pub async fn insert(&self, key: String, asset: Asset, ttl: Duration) {
        self.cache.insert(key, CachedAsset { asset, ttl }).await;
    }

    /// Remove a quote from cache
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached quote
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics.
    ///
    /// The count is eventually consistent with recent writes.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.entry_count(),
        }
    }

    /// Apply pending evictions and bookkeeping so [`stats`](Self::stats) is exact.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: u64,
}
