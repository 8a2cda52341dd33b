//! Quote aggregation: routing, cache lookup, per-provider batching and merge.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};

use super::batch::{BatchStats, ProviderFailure, QuoteBatch};
use crate::cache::{CacheTtl, QuoteCache};
use crate::currency::normalize_asset;
use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, ProviderId, SymbolParts};
use crate::provider::QuoteProvider;
use crate::registry::ProviderRegistry;
use crate::resolver::normalize_symbol;

/// Upstream items queued for one provider.
struct PendingCall {
    provider: Arc<dyn QuoteProvider>,
    /// Cache key -> first normalized symbol seen for it
    requests: BTreeMap<String, String>,
}

/// Dispatches symbol batches to providers through a shared cache.
pub struct QuoteAggregator {
    registry: Arc<ProviderRegistry>,
    cache: Arc<QuoteCache>,
    ttl: CacheTtl,
}

impl QuoteAggregator {
    pub fn new(registry: Arc<ProviderRegistry>, cache: Arc<QuoteCache>, ttl: CacheTtl) -> Self {
        Self {
            registry,
            cache,
            ttl,
        }
    }

    /// Get quotes for a batch of raw caller symbols.
    ///
    /// Invalid symbols are dropped. Every other input occurrence yields one
    /// quote whose `symbol` echoes that input exactly; symbols with no
    /// source get a null price. Cache misses are grouped so each provider
    /// receives a single call with one item per cache key, and all provider
    /// calls run concurrently. A failing provider is reported in
    /// [`QuoteBatch::failures`] without affecting the others.
    ///
    /// # Errors
    ///
    /// [`QuoteError::AssetTypeNotSupported`] when the registry has no route
    /// for `asset_type` and a symbol needs one (no provider is called), or
    /// when a routed provider does not serve `asset_type`.
    pub async fn get_quotes(
        &self,
        symbols: &[String],
        asset_type: AssetType,
    ) -> Result<QuoteBatch, QuoteError> {
        let mut stats = BatchStats {
            requested: symbols.len(),
            ..BatchStats::default()
        };
        let mut quotes = Vec::with_capacity(symbols.len());
        let mut originals: HashMap<String, Vec<String>> = HashMap::new();
        let mut pending: BTreeMap<ProviderId, PendingCall> = BTreeMap::new();

        for raw in symbols {
            let normalized = normalize_symbol(raw);
            let parts = SymbolParts::parse(&normalized);
            if !parts.is_valid() {
                debug!("Dropping invalid symbol {:?}", raw);
                stats.invalid += 1;
                continue;
            }

            let Some(provider) = self.registry.provider_for(asset_type, &parts)? else {
                debug!("No {} source for {}, answering without a price", asset_type, raw);
                stats.unroutable += 1;
                quotes.push(Asset::unavailable(raw.clone()));
                continue;
            };

            let key = QuoteCache::key(provider.id(), &parts.short_symbol);
            if let Some(mut cached) = self.cache.get(&key).await {
                debug!("Cache hit for {} ({})", raw, key);
                stats.cache_hits += 1;
                cached.symbol = raw.clone();
                quotes.push(cached);
                continue;
            }

            originals.entry(key.clone()).or_default().push(raw.clone());
            pending
                .entry(provider.id())
                .or_insert_with(|| PendingCall {
                    provider: Arc::clone(&provider),
                    requests: BTreeMap::new(),
                })
                .requests
                .entry(key)
                .or_insert(normalized);
        }

        stats.provider_calls = pending.len();
        stats.fetched = pending.values().map(|call| call.requests.len()).sum();

        let calls = pending.into_values().map(|call| async move {
            let (keys, symbols): (Vec<String>, Vec<String>) = call.requests.into_iter().unzip();
            debug!(
                "Fetching {} {} quote(s) from {}",
                symbols.len(),
                asset_type,
                call.provider.id()
            );
            let result = call.provider.fetch(asset_type, &symbols).await;
            (call.provider, keys, result)
        });

        let mut failures = Vec::new();
        for (provider, keys, result) in join_all(calls).await {
            match result {
                Ok(assets) => {
                    for asset in assets {
                        self.merge(provider.id(), asset, &mut originals, &mut quotes)
                            .await;
                    }
                    // Requested items the provider left out
                    for key in keys {
                        if let Some(raws) = originals.remove(&key) {
                            debug!("{} returned no quote for {}", provider.id(), key);
                            stats.unanswered += raws.len();
                            quotes.extend(raws.into_iter().map(Asset::unavailable));
                        }
                    }
                }
                Err(error) => {
                    let symbols: Vec<String> = keys
                        .iter()
                        .filter_map(|key| originals.remove(key))
                        .flatten()
                        .collect();
                    warn!(
                        "Provider {} failed for {} symbol(s): {}",
                        provider.id(),
                        symbols.len(),
                        error
                    );
                    failures.push(ProviderFailure {
                        provider_id: provider.id(),
                        symbols,
                        error,
                    });
                }
            }
        }

        // A provider refusing the asset type fails the batch like a missing route
        if let Some(index) = failures
            .iter()
            .position(|f| matches!(f.error, QuoteError::AssetTypeNotSupported(_)))
        {
            return Err(failures.swap_remove(index).error);
        }

        debug!("Quote batch for {}: {}", asset_type, stats.summary());
        Ok(QuoteBatch {
            quotes,
            failures,
            stats,
        })
    }

    /// Normalize and cache one returned quote, then emit a copy for every
    /// caller input still waiting on its key.
    async fn merge(
        &self,
        provider_id: ProviderId,
        asset: Asset,
        originals: &mut HashMap<String, Vec<String>>,
        quotes: &mut Vec<Asset>,
    ) {
        let asset = normalize_asset(asset);
        let parts = SymbolParts::parse(&normalize_symbol(&asset.symbol));
        let key = QuoteCache::key(provider_id, &parts.short_symbol);

        self.cache
            .insert(key.clone(), asset.clone(), self.ttl.for_asset(&asset))
            .await;

        match originals.remove(&key) {
            Some(raws) => quotes.extend(raws.into_iter().map(|raw| Asset {
                symbol: raw,
                ..asset.clone()
            })),
            None => debug!("Cached unrequested quote {} from {}", key, provider_id),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }
}
