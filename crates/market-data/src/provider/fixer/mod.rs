//! Fixer.io foreign exchange quotes.
//!
//! One `latest` call returns every rate against the account's base currency;
//! a pair `FROMTO` is priced as `rates[TO] / rates[FROM]`. The rate table is
//! memoized for 90 seconds to stay inside the API plan's request quota.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, SymbolParts};
use crate::provider::{http_client, ProviderCapabilities, QuoteProvider};
use crate::registry::FIXER_PROVIDER_ID;

const BASE_URL: &str = "http://data.fixer.io/api";

/// How long a fetched rate table is reused
const RATES_TTL: Duration = Duration::from_secs(90);

type Rates = HashMap<String, f64>;

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    #[serde(default)]
    rates: Rates,
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct FixerError {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Fixer.io latest-rates provider.
pub struct FixerProvider {
    client: Client,
    base_url: String,
    api_key: String,
    rates: Cache<(), Arc<Rates>>,
}

impl FixerProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, QuoteError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, QuoteError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            rates: Cache::builder()
                .max_capacity(1)
                .time_to_live(RATES_TTL)
                .build(),
        })
    }

    async fn latest_rates(&self) -> Result<Arc<Rates>, QuoteError> {
        if let Some(rates) = self.rates.get(&()).await {
            return Ok(rates);
        }

        let url = format!("{}/latest", self.base_url);
        let response: FixerResponse = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            let detail = response
                .error
                .map(|e| {
                    format!(
                        "{} ({})",
                        e.kind.unwrap_or_else(|| "unknown".to_string()),
                        e.code.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| "request unsuccessful".to_string());
            return Err(QuoteError::provider(FIXER_PROVIDER_ID, detail));
        }

        debug!("Fetched {} Fixer rates", response.rates.len());
        let rates = Arc::new(response.rates);
        self.rates.insert((), Arc::clone(&rates)).await;
        Ok(rates)
    }
}

/// Price a symbol against a rate table.
///
/// Returns `None` when the short symbol is not a six-letter currency pair.
/// A pair with an unknown currency is answered without a price.
fn pair_quote(symbol: &str, rates: &Rates) -> Option<Asset> {
    let parts = SymbolParts::parse(symbol);
    let pair = parts.short_symbol.to_ascii_uppercase();
    if pair.len() != 6 || !pair.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let (from, to) = pair.split_at(3);
    let quote = match (rates.get(from), rates.get(to)) {
        (Some(&from_rate), Some(&to_rate)) if from_rate != 0.0 => {
            Asset::new(symbol, to_rate / from_rate, to)
        }
        _ => Asset::unavailable(symbol),
    };
    Some(quote)
}

#[async_trait]
impl QuoteProvider for FixerProvider {
    fn id(&self) -> &'static str {
        FIXER_PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Forex],
            markets: Vec::new(),
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.ensure_supported(asset_type)?;

        let rates = self.latest_rates().await?;
        Ok(symbols
            .iter()
            .filter_map(|symbol| pair_quote(symbol, &rates))
            .collect())
    }
}
