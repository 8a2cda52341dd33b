use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use quotefeed_market_data::{
    BinanceProvider, CmeProvider, CoinbaseProvider, FailurePolicy, FixerProvider, ProviderRegistry,
    QuoteAggregator, QuoteCache, QuoteError, QuoteProvider, YahooProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub cache: Arc<QuoteCache>,
    pub aggregator: Arc<QuoteAggregator>,
    pub failure_policy: FailurePolicy,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire the cache and aggregator around an already populated registry.
    pub fn new(registry: ProviderRegistry, config: &Config) -> Arc<Self> {
        let registry = Arc::new(registry);
        let cache = Arc::new(QuoteCache::with_capacity(config.cache_capacity));
        let aggregator = Arc::new(QuoteAggregator::new(
            Arc::clone(&registry),
            Arc::clone(&cache),
            config.cache_ttl,
        ));
        Arc::new(Self {
            registry,
            cache,
            aggregator,
            failure_policy: config.failure_policy,
            started_at: Utc::now(),
        })
    }
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Providers bundled with the server, in registration order.
fn builtin_providers(config: &Config) -> Result<Vec<Arc<dyn QuoteProvider>>, QuoteError> {
    let mut providers: Vec<Arc<dyn QuoteProvider>> = vec![
        Arc::new(YahooProvider::new()?),
        Arc::new(BinanceProvider::new()?),
        Arc::new(CoinbaseProvider::new()?),
        Arc::new(CmeProvider::new()?),
    ];
    match &config.fixer_api_key {
        Some(api_key) => providers.push(Arc::new(FixerProvider::new(api_key.clone())?)),
        None => tracing::warn!("QF_FIXER_API_KEY not set, forex quotes are disabled"),
    }
    Ok(providers)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let providers = builtin_providers(config).context("Failed to create quote providers")?;
    let registry = ProviderRegistry::with_providers(config.routes.clone(), providers);
    anyhow::ensure!(!registry.is_empty(), "No quote providers registered");

    for conflict in registry.conflicts() {
        tracing::warn!(
            "Market {} claimed by both {} and {}; using {}",
            conflict.market,
            conflict.previous,
            conflict.current,
            conflict.current
        );
    }
    let missing = registry.unregistered_routes();
    tracing::info!(
        "Registered {} quote providers ({} default routes point at missing providers)",
        registry.len(),
        missing.len()
    );

    Ok(AppState::new(registry, config))
}
