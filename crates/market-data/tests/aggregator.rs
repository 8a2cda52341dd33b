use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;

use quotefeed_market_data::{
    Asset, AssetType, CacheTtl, CmeProvider, DefaultRoute, DefaultRoutes, FailurePolicy,
    ProviderCapabilities, ProviderRegistry, QuoteAggregator, QuoteCache, QuoteError,
    QuoteProvider, SymbolParts, YahooProvider,
};

// ============================================================================
// Mock provider
// ============================================================================

struct MockProvider {
    id: &'static str,
    markets: Vec<&'static str>,
    asset_types: &'static [AssetType],
    /// Short symbol -> (price, currency)
    prices: HashMap<String, (Option<f64>, &'static str)>,
    /// Extra quotes returned regardless of the request
    unsolicited: Vec<Asset>,
    should_fail: bool,
    barrier: Option<Arc<Barrier>>,
    call_count: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
}

impl MockProvider {
    fn new(id: &'static str) -> Self {
        Self {
            id,
            markets: Vec::new(),
            asset_types: &AssetType::ALL,
            prices: HashMap::new(),
            unsolicited: Vec::new(),
            should_fail: false,
            barrier: None,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn markets(mut self, markets: &[&'static str]) -> Self {
        self.markets = markets.to_vec();
        self
    }

    fn asset_types(mut self, asset_types: &'static [AssetType]) -> Self {
        self.asset_types = asset_types;
        self
    }

    fn price(mut self, short_symbol: &str, price: f64, currency: &'static str) -> Self {
        self.prices
            .insert(short_symbol.to_string(), (Some(price), currency));
        self
    }

    fn no_price(mut self, short_symbol: &str) -> Self {
        self.prices.insert(short_symbol.to_string(), (None, "USD"));
        self
    }

    fn unsolicited(mut self, asset: Asset) -> Self {
        self.unsolicited.push(asset);
        self
    }

    fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    fn barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: self.asset_types,
            markets: self.markets.clone(),
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(symbols.to_vec());
        self.ensure_supported(asset_type)?;

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.should_fail {
            return Err(QuoteError::provider(self.id, "upstream unavailable"));
        }

        let mut quotes: Vec<Asset> = symbols
            .iter()
            .filter_map(|symbol| {
                let parts = SymbolParts::parse(symbol);
                self.prices
                    .get(&parts.short_symbol)
                    .map(|(price, currency)| match price {
                        Some(price) => Asset::new(symbol.clone(), *price, *currency),
                        None => Asset::unavailable(symbol.clone()),
                    })
            })
            .collect();
        quotes.extend(self.unsolicited.iter().cloned());
        Ok(quotes)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn symbols(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn aggregator_with(
    routes: DefaultRoutes,
    providers: Vec<Arc<MockProvider>>,
    ttl: CacheTtl,
) -> QuoteAggregator {
    let registry = ProviderRegistry::with_providers(
        routes,
        providers
            .into_iter()
            .map(|p| p as Arc<dyn QuoteProvider>),
    );
    QuoteAggregator::new(Arc::new(registry), Arc::new(QuoteCache::new()), ttl)
}

fn stock_routes(provider_id: &str) -> DefaultRoutes {
    DefaultRoutes::empty().with_route(
        AssetType::Stock,
        DefaultRoute::generic(provider_id).with_mic(provider_id),
    )
}

fn find<'a>(quotes: &'a [Asset], symbol: &str) -> &'a Asset {
    quotes
        .iter()
        .find(|q| q.symbol == symbol)
        .unwrap_or_else(|| panic!("no quote for {}", symbol))
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn second_call_within_ttl_is_served_from_cache() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("AAPL", 190.5, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let first = aggregator
        .get_quotes(&symbols(&["AAPL"]), AssetType::Stock)
        .await
        .unwrap();
    let second = aggregator
        .get_quotes(&symbols(&["AAPL"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert_eq!(first.quotes, second.quotes);
    assert_eq!(second.quotes, vec![Asset::new("AAPL", 190.5, "USD")]);
    assert_eq!(second.stats.cache_hits, 1);
    assert_eq!(second.stats.provider_calls, 0);
}

#[tokio::test]
async fn cache_hit_echoes_the_new_callers_formatting() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("AAPL", 190.5, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    aggregator
        .get_quotes(&symbols(&["AAPL"]), AssetType::Stock)
        .await
        .unwrap();
    let batch = aggregator
        .get_quotes(&symbols(&[" aapl"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(provider.calls(), 1);
    assert_eq!(batch.quotes, vec![Asset::new(" aapl", 190.5, "USD")]);
}

#[tokio::test]
async fn unresolvable_quote_expires_with_invalid_ttl() {
    let provider = Arc::new(MockProvider::new("STOCKS").no_price("GONE"));
    let ttl = CacheTtl::new(Duration::from_secs(3600), Duration::from_millis(50));
    let aggregator = aggregator_with(stock_routes("STOCKS"), vec![provider.clone()], ttl);

    let batch = aggregator
        .get_quotes(&symbols(&["GONE"]), AssetType::Stock)
        .await
        .unwrap();
    assert_eq!(batch.quotes, vec![Asset::unavailable("GONE")]);

    // Still cached within the invalid TTL
    aggregator
        .get_quotes(&symbols(&["GONE"]), AssetType::Stock)
        .await
        .unwrap();
    assert_eq!(provider.calls(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    aggregator
        .get_quotes(&symbols(&["GONE"]), AssetType::Stock)
        .await
        .unwrap();
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn cache_key_is_provider_and_short_symbol() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("VOD", 72.5, "GBP"));
    let cache = Arc::new(QuoteCache::new());
    let registry = ProviderRegistry::with_providers(
        stock_routes("STOCKS"),
        [provider.clone() as Arc<dyn QuoteProvider>],
    );
    let aggregator = QuoteAggregator::new(Arc::new(registry), cache.clone(), CacheTtl::default());

    aggregator
        .get_quotes(&symbols(&["XLON:VOD"]), AssetType::Stock)
        .await
        .unwrap();

    let cached = cache.get("STOCKS_VOD").await.unwrap();
    assert_eq!(cached.price, Some(72.5));
    assert_eq!(cached.currency.as_deref(), Some("GBP"));
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn unroutable_symbol_yields_null_quote_without_network_calls() {
    let provider = Arc::new(MockProvider::new("MICS").price("FOO", 1.0, "EUR"));
    let routes =
        DefaultRoutes::empty().with_route(AssetType::Stock, DefaultRoute::default().with_mic("MICS"));
    let aggregator = aggregator_with(routes, vec![provider.clone()], CacheTtl::default());

    let batch = aggregator
        .get_quotes(&symbols(&["UNKNOWN:FOO"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(batch.quotes, vec![Asset::unavailable("UNKNOWN:FOO")]);
    assert_eq!(batch.stats.unroutable, 1);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn market_code_overrides_asset_type_default() {
    let binance = Arc::new(MockProvider::new("BINANCE").price("BTC", 64000.0, "USD"));
    let coinbase = Arc::new(
        MockProvider::new("COINBASE")
            .markets(&["COINBASE", "GDAX"])
            .price("BTC", 63990.0, "USD"),
    );
    let routes = DefaultRoutes::empty()
        .with_route(AssetType::Cryptocurrency, DefaultRoute::generic("BINANCE"));
    let aggregator = aggregator_with(
        routes,
        vec![binance.clone(), coinbase.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["BTC", "gdax:btc"]), AssetType::Cryptocurrency)
        .await
        .unwrap();

    assert_eq!(find(&batch.quotes, "BTC").price, Some(64000.0));
    assert_eq!(find(&batch.quotes, "gdax:btc").price, Some(63990.0));
    assert_eq!(coinbase.requests(), vec![vec!["GDAX:BTC".to_string()]]);
    assert_eq!(binance.requests(), vec![vec!["BTC".to_string()]]);
}

#[tokio::test]
async fn unsupported_asset_type_fails_whole_batch() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("GC", 2400.0, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let err = aggregator
        .get_quotes(&symbols(&["GC", "SI"]), AssetType::Commodity)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QuoteError::AssetTypeNotSupported(AssetType::Commodity)
    ));
    assert_eq!(err.to_string(), "Asset type not supported: Commodity");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_rejecting_asset_type_fails_whole_batch() {
    let stocks = Arc::new(
        MockProvider::new("STOCKS")
            .markets(&["XLON"])
            .asset_types(&[AssetType::Stock])
            .price("VOD", 72.5, "GBP"),
    );
    let bonds = Arc::new(MockProvider::new("BONDS").markets(&["XSTU"]).price("DE0001102580", 98.7, "EUR"));
    let aggregator = aggregator_with(
        DefaultRoutes::empty(),
        vec![stocks.clone(), bonds.clone()],
        CacheTtl::default(),
    );

    let err = aggregator
        .get_quotes(&symbols(&["XLON:VOD", "XSTU:DE0001102580"]), AssetType::Bond)
        .await
        .unwrap_err();

    assert!(matches!(err, QuoteError::AssetTypeNotSupported(AssetType::Bond)));
    assert_eq!(stocks.calls(), 1);
}

// ============================================================================
// Batching and merging
// ============================================================================

#[tokio::test]
async fn same_pair_is_requested_once_and_echoed_per_input() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("AAPL", 190.5, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["AAPL", "NASDAQ:AAPL"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(provider.requests(), vec![vec!["AAPL".to_string()]]);
    assert_eq!(batch.quotes.len(), 2);
    assert_eq!(find(&batch.quotes, "AAPL").price, Some(190.5));
    assert_eq!(find(&batch.quotes, "NASDAQ:AAPL").price, Some(190.5));
    assert_eq!(batch.stats.fetched, 1);
}

#[tokio::test]
async fn duplicate_inputs_each_get_their_own_quote() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("MSFT", 410.2, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["msft", "MSFT", "msft"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(provider.requests(), vec![vec!["MSFT".to_string()]]);
    let mut echoed: Vec<_> = batch.quotes.iter().map(|q| q.symbol.as_str()).collect();
    echoed.sort_unstable();
    assert_eq!(echoed, vec!["MSFT", "msft", "msft"]);
    assert!(batch.quotes.iter().all(|q| q.price == Some(410.2)));
}

#[tokio::test]
async fn invalid_symbols_are_dropped_silently() {
    let provider = Arc::new(
        MockProvider::new("STOCKS")
            .price("AAPL", 190.5, "USD")
            .price("IBM", 170.0, "USD"),
    );
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(
            &symbols(&["AAPL", "??", "", "TOOLONGSYMBOL1", "IBM"]),
            AssetType::Stock,
        )
        .await
        .unwrap();

    assert_eq!(batch.quotes.len(), 2);
    assert!(batch.quotes.iter().all(|q| q.symbol != "??"));
    assert_eq!(batch.stats.invalid, 3);
    assert_eq!(provider.requests(), vec![vec!["AAPL".to_string(), "IBM".to_string()]]);
}

#[tokio::test]
async fn penny_sterling_is_normalized_before_caching() {
    let provider = Arc::new(
        MockProvider::new("LSE")
            .markets(&["XLON"])
            .price("VOD", 12345.0, "GBX"),
    );
    let aggregator = aggregator_with(
        DefaultRoutes::empty(),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["XLON:VOD"]), AssetType::Stock)
        .await
        .unwrap();
    assert_eq!(batch.quotes, vec![Asset::new("XLON:VOD", 123.45, "GBP")]);

    let cached = aggregator.cache().get("LSE_VOD").await.unwrap();
    assert_eq!(cached.currency.as_deref(), Some("GBP"));
    assert_eq!(cached.price, Some(123.45));
}

#[tokio::test]
async fn omitted_symbols_are_answered_without_price_and_not_cached() {
    let provider = Arc::new(MockProvider::new("STOCKS").price("AAPL", 190.5, "USD"));
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["AAPL", "ZZZZ"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(find(&batch.quotes, "ZZZZ"), &Asset::unavailable("ZZZZ"));
    assert_eq!(batch.stats.unanswered, 1);
    assert!(aggregator.cache().get("STOCKS_ZZZZ").await.is_none());
}

#[tokio::test]
async fn unrequested_quotes_are_cached_but_not_returned() {
    let provider = Arc::new(
        MockProvider::new("STOCKS")
            .price("AAPL", 190.5, "USD")
            .unsolicited(Asset::new("GOOG", 170.0, "USD")),
    );
    let aggregator = aggregator_with(
        stock_routes("STOCKS"),
        vec![provider.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(&symbols(&["AAPL"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(batch.quotes, vec![Asset::new("AAPL", 190.5, "USD")]);
    assert!(aggregator.cache().get("STOCKS_GOOG").await.is_some());
}

// ============================================================================
// Concurrency and partial failure
// ============================================================================

#[tokio::test]
async fn providers_are_called_concurrently() {
    // Each fetch waits for the other; a sequential join would never finish
    let barrier = Arc::new(Barrier::new(2));
    let stocks = Arc::new(
        MockProvider::new("STOCKS")
            .markets(&["XNYS"])
            .price("IBM", 170.0, "USD")
            .barrier(barrier.clone()),
    );
    let crypto = Arc::new(
        MockProvider::new("CRYPTO")
            .markets(&["BINANCE"])
            .price("BTC", 64000.0, "USD")
            .barrier(barrier),
    );
    let aggregator = aggregator_with(
        DefaultRoutes::empty(),
        vec![stocks.clone(), crypto.clone()],
        CacheTtl::default(),
    );

    let batch = tokio::time::timeout(
        Duration::from_secs(5),
        aggregator.get_quotes(&symbols(&["XNYS:IBM", "BINANCE:BTC"]), AssetType::Stock),
    )
    .await
    .expect("provider calls did not overlap")
    .unwrap();

    assert_eq!(batch.quotes.len(), 2);
    assert_eq!(batch.stats.provider_calls, 2);
}

#[tokio::test]
async fn failing_provider_does_not_drop_healthy_results() {
    let healthy = Arc::new(
        MockProvider::new("HEALTHY")
            .markets(&["XNYS"])
            .price("IBM", 170.0, "USD"),
    );
    let flaky = Arc::new(MockProvider::new("FLAKY").markets(&["XLON"]).failing());
    let aggregator = aggregator_with(
        DefaultRoutes::empty(),
        vec![healthy.clone(), flaky.clone()],
        CacheTtl::default(),
    );

    let batch = aggregator
        .get_quotes(
            &symbols(&["XNYS:IBM", "XLON:VOD", "xlon:vod"]),
            AssetType::Stock,
        )
        .await
        .unwrap();

    assert_eq!(batch.quotes, vec![Asset::new("XNYS:IBM", 170.0, "USD")]);
    assert_eq!(batch.failed_providers(), vec!["FLAKY"]);
    let mut failed_symbols = batch.failures[0].symbols.clone();
    failed_symbols.sort();
    assert_eq!(failed_symbols, vec!["XLON:VOD", "xlon:vod"]);
    assert!(aggregator.cache().get("FLAKY_VOD").await.is_none());

    // Nothing was cached for the failed provider, so it is asked again
    aggregator
        .get_quotes(&symbols(&["XLON:VOD"]), AssetType::Stock)
        .await
        .unwrap();
    assert_eq!(flaky.calls(), 2);
}

#[tokio::test]
async fn fail_fast_policy_fails_the_batch() {
    let healthy = Arc::new(
        MockProvider::new("HEALTHY")
            .markets(&["XNYS"])
            .price("IBM", 170.0, "USD"),
    );
    let flaky = Arc::new(MockProvider::new("FLAKY").markets(&["XLON"]).failing());
    let aggregator = aggregator_with(
        DefaultRoutes::empty(),
        vec![healthy, flaky],
        CacheTtl::default(),
    );

    let err = aggregator
        .get_quotes(&symbols(&["XNYS:IBM", "XLON:VOD"]), AssetType::Stock)
        .await
        .unwrap()
        .into_result(FailurePolicy::FailFast)
        .unwrap_err();

    assert_eq!(err.to_string(), "Provider error: FLAKY - upstream unavailable");
}

#[tokio::test]
async fn venue_without_yahoo_listing_is_answered_without_price() {
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(YahooProvider::new().unwrap())];
    let registry = Arc::new(ProviderRegistry::with_providers(
        DefaultRoutes::standard(),
        providers,
    ));
    let aggregator =
        QuoteAggregator::new(registry, Arc::new(QuoteCache::new()), CacheTtl::default());

    // XWAR is a MIC with no Yahoo suffix; the bare ticker would be a US listing
    let batch = aggregator
        .get_quotes(&symbols(&["XWAR:PKN"]), AssetType::Stock)
        .await
        .unwrap();

    assert_eq!(batch.quotes, vec![Asset::unavailable("XWAR:PKN")]);
    assert_eq!(batch.stats.unanswered, 1);
    assert!(batch.is_complete());
}

#[tokio::test]
async fn commodities_route_to_cme_by_default() {
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(CmeProvider::new().unwrap())];
    let registry = Arc::new(ProviderRegistry::with_providers(
        DefaultRoutes::standard(),
        providers,
    ));

    let provider = registry
        .provider_for(AssetType::Commodity, &SymbolParts::parse("GC"))
        .unwrap()
        .unwrap();
    assert_eq!(provider.id(), "CME");

    let aggregator =
        QuoteAggregator::new(registry, Arc::new(QuoteCache::new()), CacheTtl::default());
    let batch = aggregator
        .get_quotes(&symbols(&["widget"]), AssetType::Commodity)
        .await
        .unwrap();
    assert_eq!(batch.quotes, vec![Asset::unavailable("widget")]);
}
