//! Coinbase Exchange cryptocurrency quotes.
//!
//! Coinbase has no multi-product ticker, so each symbol is one request. The
//! requests of a batch run concurrently and a failed symbol is answered
//! with a null price instead of failing the batch.

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, SymbolParts};
use crate::provider::{http_client, ProviderCapabilities, QuoteProvider};
use crate::registry::COINBASE_PROVIDER_ID;

const BASE_URL: &str = "https://api.exchange.coinbase.com";

/// Quote currencies recognized at the end of a short symbol
const QUOTE_CURRENCIES: &[&str] = &["USD", "EUR"];

#[derive(Debug, Deserialize)]
struct CoinbaseTicker {
    price: String,
}

/// Coinbase Exchange ticker provider.
pub struct CoinbaseProvider {
    client: Client,
    base_url: String,
}

impl CoinbaseProvider {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, QuoteError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Asset, QuoteError> {
        let parts = SymbolParts::parse(symbol);
        let (product, currency) = coinbase_product(&parts.short_symbol)
            .ok_or_else(|| QuoteError::SymbolNotSupported(symbol.to_string()))?;

        let url = format!("{}/products/{}/ticker", self.base_url, product);
        let ticker: CoinbaseTicker = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = ticker
            .price
            .parse::<f64>()
            .map_err(|_| QuoteError::SymbolQuote(symbol.to_string()))?;
        Ok(Asset::new(symbol, price, currency))
    }
}

/// Coinbase product id and quote currency for a short symbol.
///
/// `BTCEUR` maps to `BTC-EUR`; a symbol without a recognized quote currency
/// is quoted in USD (`BTC` maps to `BTC-USD`). Symbols without letters have
/// no product.
fn coinbase_product(short_symbol: &str) -> Option<(String, &'static str)> {
    let symbol = short_symbol.to_ascii_uppercase();
    if !symbol.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    for &currency in QUOTE_CURRENCIES {
        if let Some(base) = symbol.strip_suffix(currency) {
            if !base.is_empty() {
                return Some((format!("{}-{}", base, currency), currency));
            }
        }
    }
    Some((format!("{}-USD", symbol), "USD"))
}

#[async_trait]
impl QuoteProvider for CoinbaseProvider {
    fn id(&self) -> &'static str {
        COINBASE_PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Cryptocurrency],
            markets: vec!["COINBASE", "GDAX"],
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.ensure_supported(asset_type)?;

        let requests = symbols.iter().map(|symbol| async move {
            self.fetch_one(symbol).await.unwrap_or_else(|e| {
                warn!("Could not get Coinbase quote for {}: {}", symbol, e);
                Asset::unavailable(symbol.clone())
            })
        });
        Ok(join_all(requests).await)
    }
}
