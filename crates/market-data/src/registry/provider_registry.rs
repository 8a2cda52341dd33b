//! Provider registry: market-code index and asset-type default routing.
//!
//! The registry is filled once at startup and then shared read-only
//! (typically behind an `Arc`). Resolution for a parsed symbol:
//!
//! 1. A market code owned by a registered provider always wins.
//! 2. Otherwise the asset type's [`DefaultRoute`] is consulted.
//! 3. An asset type with no usable route fails the whole batch with
//!    [`QuoteError::AssetTypeNotSupported`].

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::default_routes::{DefaultRoute, DefaultRoutes, RouteSlot};
use crate::errors::QuoteError;
use crate::models::{AssetType, ProviderId, SymbolParts};
use crate::provider::QuoteProvider;
use crate::resolver::{is_valid_isin, is_valid_mic};

/// A market code claimed by more than one provider.
///
/// The later registration owns the market; the conflict is kept so it can be
/// reported at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConflict {
    pub market: String,
    pub previous: ProviderId,
    pub current: ProviderId,
}

/// Registry of quote providers.
pub struct ProviderRegistry {
    /// Providers in registration order
    providers: Vec<Arc<dyn QuoteProvider>>,
    by_id: HashMap<ProviderId, Arc<dyn QuoteProvider>>,
    /// Upper-cased market code -> owning provider
    markets: HashMap<String, Arc<dyn QuoteProvider>>,
    routes: DefaultRoutes,
    conflicts: Vec<MarketConflict>,
}

impl ProviderRegistry {
    /// Create an empty registry using the given default routing table.
    pub fn new(routes: DefaultRoutes) -> Self {
        Self {
            providers: Vec::new(),
            by_id: HashMap::new(),
            markets: HashMap::new(),
            routes,
            conflicts: Vec::new(),
        }
    }

    /// Create a registry and register `providers` in order.
    pub fn with_providers(
        routes: DefaultRoutes,
        providers: impl IntoIterator<Item = Arc<dyn QuoteProvider>>,
    ) -> Self {
        let mut registry = Self::new(routes);
        for provider in providers {
            registry.register(provider);
        }
        registry
    }

    /// Register a provider and index its market codes.
    ///
    /// Registering an id twice is a no-op and returns `false`. A market code
    /// already owned by another provider is taken over by this one and the
    /// takeover is recorded in [`conflicts`](Self::conflicts).
    pub fn register(&mut self, provider: Arc<dyn QuoteProvider>) -> bool {
        let id = provider.id();
        if self.by_id.contains_key(id) {
            debug!("Provider {} already registered, ignoring", id);
            return false;
        }

        let capabilities = provider.capabilities();
        for market in &capabilities.markets {
            let market = market.to_ascii_uppercase();
            if let Some(previous) = self.markets.insert(market.clone(), Arc::clone(&provider)) {
                if previous.id() != id {
                    warn!(
                        "Market {} was owned by {}, now routed to {}",
                        market,
                        previous.id(),
                        id
                    );
                    self.conflicts.push(MarketConflict {
                        market,
                        previous: previous.id(),
                        current: id,
                    });
                }
            }
        }

        info!(
            "Registered provider {} ({} markets, asset types: {:?})",
            id,
            capabilities.markets.len(),
            capabilities.asset_types
        );
        self.by_id.insert(id, Arc::clone(&provider));
        self.providers.push(provider);
        true
    }

    /// Provider owning a market code, if any.
    pub fn lookup(&self, market_code: &str) -> Option<Arc<dyn QuoteProvider>> {
        if market_code.is_empty() {
            return None;
        }
        self.markets
            .get(&market_code.to_ascii_uppercase())
            .cloned()
    }

    /// Provider registered under `id`, if any.
    pub fn get(&self, id: &str) -> Option<Arc<dyn QuoteProvider>> {
        self.by_id.get(id).cloned()
    }

    /// Resolve the provider for a parsed symbol.
    ///
    /// Returns `Ok(None)` when the symbol has no source (the caller answers it
    /// with a null quote) and `Err` when the asset type itself is unroutable.
    pub fn provider_for(
        &self,
        asset_type: AssetType,
        parts: &SymbolParts,
    ) -> Result<Option<Arc<dyn QuoteProvider>>, QuoteError> {
        if let Some(provider) = self.lookup(&parts.market_code) {
            return Ok(Some(provider));
        }
        self.default_provider_for(asset_type, parts)
    }

    /// Resolve the asset-type default for a symbol, ignoring its market code.
    pub fn default_provider_for(
        &self,
        asset_type: AssetType,
        parts: &SymbolParts,
    ) -> Result<Option<Arc<dyn QuoteProvider>>, QuoteError> {
        let route = self
            .routes
            .route(asset_type)
            .filter(|route| route.slots().any(|(_, id)| self.by_id.contains_key(id)))
            .ok_or(QuoteError::AssetTypeNotSupported(asset_type))?;

        Ok(Self::applicable_slots(route, parts)
            .find_map(|id| self.by_id.get(id))
            .cloned())
    }

    fn applicable_slots<'a>(
        route: &'a DefaultRoute,
        parts: &'a SymbolParts,
    ) -> impl Iterator<Item = &'a str> {
        route.slots().filter_map(move |(slot, id)| {
            let applies = match slot {
                RouteSlot::Isin => is_valid_isin(&parts.short_symbol),
                RouteSlot::Mic => is_valid_mic(&parts.market_code),
                RouteSlot::Generic => true,
            };
            applies.then_some(id)
        })
    }

    /// Route slots naming providers that are not registered.
    ///
    /// Such slots are skipped during resolution; this is for startup reporting.
    pub fn unregistered_routes(&self) -> Vec<(AssetType, RouteSlot, String)> {
        let mut missing = Vec::new();
        for (asset_type, route) in self.routes.iter() {
            for (slot, id) in route.slots() {
                if !self.by_id.contains_key(id) {
                    warn!(
                        "Default {} route for {} names unregistered provider {}",
                        slot, asset_type, id
                    );
                    missing.push((asset_type, slot, id.to_string()));
                }
            }
        }
        missing
    }

    /// Providers in registration order.
    pub fn providers(&self) -> &[Arc<dyn QuoteProvider>] {
        &self.providers
    }

    /// Market codes owned by `id`, sorted.
    pub fn markets_of(&self, id: &str) -> Vec<String> {
        let mut markets: Vec<String> = self
            .markets
            .iter()
            .filter(|(_, provider)| provider.id() == id)
            .map(|(market, _)| market.clone())
            .collect();
        markets.sort();
        markets
    }

    pub fn conflicts(&self) -> &[MarketConflict] {
        &self.conflicts
    }

    pub fn routes(&self) -> &DefaultRoutes {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
