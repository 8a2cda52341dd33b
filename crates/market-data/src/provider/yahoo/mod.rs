//! Yahoo Finance stock and mutual fund quotes.
//!
//! Symbols are translated to Yahoo tickers by MIC (`XLON:VOD` -> `VOD.L`)
//! and requested in chunks through the v7 quote endpoint. The endpoint
//! needs a cookie + crumb pair, which is fetched on first use and refreshed
//! when Yahoo rejects it.

mod models;

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client, StatusCode};
use tokio::sync::RwLock;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, SymbolParts};
use crate::provider::{http_client, ProviderCapabilities, QuoteProvider};
use crate::registry::YAHOO_PROVIDER_ID;
use crate::resolver::{is_valid_mic, yahoo_markets, yahoo_suffix_for_mic, yahoo_symbol};

use models::{YahooQuote, YahooQuoteResponse};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

/// Yahoo rejects longer symbol lists
const MAX_SYMBOLS_PER_REQUEST: usize = 50;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance quote provider.
///
/// Owns every MIC in the exchange suffix table.
pub struct YahooProvider {
    client: Client,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    pub fn new() -> Result<Self, QuoteError> {
        Ok(Self {
            client: http_client()?,
            crumb: RwLock::new(None),
        })
    }

    /// Ensure we have a Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, QuoteError> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut guard = self.crumb.write().await;
        // Another task may have refreshed it while we waited
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.fetch_crumb().await?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, QuoteError> {
        // Step 1: cookie from fc.yahoo.com (the response status is irrelevant)
        let response = self
            .client
            .get(COOKIE_URL)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| QuoteError::provider(YAHOO_PROVIDER_ID, format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| QuoteError::provider(YAHOO_PROVIDER_ID, "Failed to parse Yahoo cookie"))?;

        // Step 2: crumb for that cookie
        let crumb = self
            .client
            .get(CRUMB_URL)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| QuoteError::provider(YAHOO_PROVIDER_ID, format!("Failed to get crumb: {}", e)))?
            .text()
            .await?;

        debug!("Obtained Yahoo crumb");
        Ok(CrumbData { cookie, crumb })
    }

    /// Clear the cached crumb (used when authentication fails)
    async fn clear_crumb(&self) {
        *self.crumb.write().await = None;
    }

    /// Request one chunk of tickers, refreshing the crumb once on an auth failure.
    async fn fetch_chunk(&self, tickers: &[String]) -> Result<Vec<YahooQuote>, QuoteError> {
        let mut retried = false;
        loop {
            let crumb = self.ensure_crumb().await?;
            let symbols = tickers.join(",");
            let response = self
                .client
                .get(QUOTE_URL)
                .query(&[
                    ("symbols", symbols.as_str()),
                    ("crumb", crumb.crumb.as_str()),
                    ("lang", "en-US"),
                    ("region", "US"),
                ])
                .header(header::USER_AGENT, BROWSER_USER_AGENT)
                .header(header::COOKIE, &crumb.cookie)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                self.clear_crumb().await;
                if retried {
                    return Err(QuoteError::provider(
                        YAHOO_PROVIDER_ID,
                        "Yahoo authentication expired",
                    ));
                }
                warn!("Yahoo rejected crumb ({}), refreshing", status);
                retried = true;
                continue;
            }

            let data: YahooQuoteResponse = response.error_for_status()?.json().await?;
            return Ok(data.quote_response.result);
        }
    }
}

/// Group requested symbols by the Yahoo ticker they translate to.
///
/// A MIC without a Yahoo suffix is left out: the bare ticker would name a
/// listing on another venue.
fn request_tickers(symbols: &[String]) -> HashMap<String, Vec<&String>> {
    let mut tickers: HashMap<String, Vec<&String>> = HashMap::new();
    for symbol in symbols {
        let parts = SymbolParts::parse(symbol);
        let unlisted =
            is_valid_mic(&parts.market_code) && yahoo_suffix_for_mic(&parts.market_code).is_none();
        if unlisted {
            debug!("No Yahoo venue for {}, skipping", symbol);
            continue;
        }
        tickers.entry(yahoo_symbol(&parts)).or_default().push(symbol);
    }
    tickers
}

/// Answer requested symbols from Yahoo quotes; unrequested tickers are ignored.
fn map_quotes(quotes: Vec<YahooQuote>, tickers: &mut HashMap<String, Vec<&String>>) -> Vec<Asset> {
    let mut assets = Vec::new();
    for quote in quotes {
        let Some(inputs) = tickers.remove(&quote.symbol) else {
            continue;
        };
        for input in inputs {
            assets.push(Asset {
                symbol: input.clone(),
                price: quote.regular_market_price,
                currency: quote.currency.clone(),
                percent_price: None,
            });
        }
    }
    assets
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        YAHOO_PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Stock, AssetType::MutualFund],
            markets: yahoo_markets(),
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.ensure_supported(asset_type)?;

        let mut tickers = request_tickers(symbols);
        let mut requested: Vec<String> = tickers.keys().cloned().collect();
        requested.sort();

        let mut assets = Vec::with_capacity(symbols.len());
        for chunk in requested.chunks(MAX_SYMBOLS_PER_REQUEST) {
            let quotes = self.fetch_chunk(chunk).await?;
            debug!("Yahoo returned {} of {} quotes", quotes.len(), chunk.len());
            assets.extend(map_quotes(quotes, &mut tickers));
        }
        Ok(assets)
    }
}
