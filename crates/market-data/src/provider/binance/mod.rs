//! Binance cryptocurrency quotes.
//!
//! A single call to the public ticker endpoint returns every spot pair, so a
//! whole batch costs one request. Prices are quoted against USDT and
//! reported as USD.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, SymbolParts};
use crate::provider::{http_client, ProviderCapabilities, QuoteProvider};
use crate::registry::BINANCE_PROVIDER_ID;

const TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/price";

#[derive(Debug, Deserialize)]
struct BinanceTicker {
    symbol: String,
    price: String,
}

/// Binance spot ticker provider.
pub struct BinanceProvider {
    client: Client,
    ticker_url: String,
}

impl BinanceProvider {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_ticker_url(TICKER_URL)
    }

    /// Point the provider at another ticker endpoint (mirrors, testnet).
    pub fn with_ticker_url(ticker_url: impl Into<String>) -> Result<Self, QuoteError> {
        Ok(Self {
            client: http_client()?,
            ticker_url: ticker_url.into(),
        })
    }
}

/// Binance pair for a short symbol: `BTC` and `BTCUSD` both become `BTCUSDT`.
fn binance_pair(short_symbol: &str) -> String {
    let symbol = short_symbol.to_ascii_uppercase();
    let symbol = match symbol.strip_suffix("USD") {
        Some(base) => format!("{}USDT", base),
        None => symbol,
    };
    if symbol.ends_with("USDT") {
        symbol
    } else {
        format!("{}USDT", symbol)
    }
}

/// Answer each requested symbol from the full ticker list.
fn map_tickers(tickers: Vec<BinanceTicker>, symbols: &[String]) -> Vec<Asset> {
    let mut requested: HashMap<String, Vec<&String>> = HashMap::new();
    for symbol in symbols {
        let parts = SymbolParts::parse(symbol);
        requested
            .entry(binance_pair(&parts.short_symbol))
            .or_default()
            .push(symbol);
    }

    let mut quotes = Vec::with_capacity(symbols.len());
    for ticker in tickers {
        let Some(inputs) = requested.remove(&ticker.symbol) else {
            continue;
        };
        for input in inputs {
            quotes.push(match ticker.price.parse::<f64>() {
                Ok(price) => Asset::new(input.clone(), price, "USD"),
                Err(_) => Asset::unavailable(input.clone()),
            });
        }
    }
    quotes
}

#[async_trait]
impl QuoteProvider for BinanceProvider {
    fn id(&self) -> &'static str {
        BINANCE_PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Cryptocurrency],
            markets: vec!["BINANCE"],
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.ensure_supported(asset_type)?;

        let tickers: Vec<BinanceTicker> = self
            .client
            .get(&self.ticker_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Binance returned {} tickers", tickers.len());

        Ok(map_tickers(tickers, symbols))
    }
}
