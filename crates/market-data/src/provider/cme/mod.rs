//! CME Group commodity futures quotes.
//!
//! Commodities are quoted from the front-month future of their CME product.
//! The public front-months endpoint takes a list of numeric product ids, so a
//! whole batch costs one request.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType, SymbolParts};
use crate::provider::{http_client, ProviderCapabilities, QuoteProvider};
use crate::registry::CME_PROVIDER_ID;

const FRONT_MONTHS_URL: &str = "https://www.cmegroup.com/CmeWS/mvc/Quotes/FrontMonths";

/// A CME futures product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CmeProduct {
    id: u32,
    code: &'static str,
}

const fn product(id: u32, code: &'static str) -> CmeProduct {
    CmeProduct { id, code }
}

/// Accepted commodity symbols, including common aliases.
const COMMODITY_CODES: &[(&str, CmeProduct)] = &[
    // Metals
    ("AU", product(437, "GC")),
    ("GC", product(437, "GC")),
    ("GOLD", product(437, "GC")),
    ("PLATINUM", product(446, "PL")),
    ("PT", product(446, "PL")),
    ("PL", product(446, "PL")),
    ("ALUMINIUM", product(7440, "ALI")),
    ("AL", product(7440, "ALI")),
    ("ALI", product(7440, "ALI")),
    ("SILVER", product(458, "SI")),
    ("AG", product(458, "SI")),
    ("SI", product(458, "SI")),
    ("COPPER", product(438, "HG")),
    ("CU", product(438, "HG")),
    ("HG", product(438, "HG")),
    ("PALLADIUM", product(445, "PA")),
    ("PD", product(445, "PA")),
    ("PA", product(445, "PA")),
    // Agricultural
    ("CORN", product(300, "ZC")),
    ("ZC", product(300, "ZC")),
    ("SOYBEAN", product(320, "ZS")),
    ("ZS", product(320, "ZS")),
    ("LE", product(22, "LE")),
    ("ZW", product(323, "ZW")),
    // Energy
    ("OIL", product(425, "CL")),
    ("CL", product(425, "CL")),
    ("BZ", product(424, "BZ")),
    ("RB", product(429, "RB")),
    ("NG", product(444, "NG")),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CmeQuote {
    product_code: String,
    #[serde(default)]
    last: Option<String>,
}

/// CME front-month futures provider.
pub struct CmeProvider {
    client: Client,
    front_months_url: String,
}

impl CmeProvider {
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_front_months_url(FRONT_MONTHS_URL)
    }

    pub fn with_front_months_url(url: impl Into<String>) -> Result<Self, QuoteError> {
        Ok(Self {
            client: http_client()?,
            front_months_url: url.into(),
        })
    }
}

/// CME product for a short symbol.
///
/// ISO-style metal codes (`XAU`, `XAG`) drop their leading `X`.
fn cme_product(short_symbol: &str) -> Option<CmeProduct> {
    let symbol = short_symbol.to_ascii_uppercase();
    let symbol = match symbol.strip_prefix('X') {
        Some(rest) if rest.len() == 2 && rest.chars().all(|c| c.is_ascii_alphabetic()) => rest,
        _ => symbol.as_str(),
    };
    COMMODITY_CODES
        .iter()
        .find(|(alias, _)| *alias == symbol)
        .map(|(_, product)| *product)
}

/// CME prints fractional prices with an apostrophe (`450'2`).
fn parse_last(last: &str) -> Option<f64> {
    last.replace('\'', ".").parse::<f64>().ok()
}

/// Answer requested symbols from the front-month quotes.
fn map_quotes(
    quotes: Vec<CmeQuote>,
    requested: &mut HashMap<&'static str, Vec<&String>>,
) -> Vec<Asset> {
    let mut assets = Vec::new();
    for quote in quotes {
        let Some(product) = cme_product(&quote.product_code) else {
            continue;
        };
        let Some(inputs) = requested.remove(product.code) else {
            continue;
        };
        let price = quote.last.as_deref().and_then(parse_last);
        for input in inputs {
            assets.push(match price {
                Some(price) => Asset::new(input.clone(), price, "USD"),
                None => Asset::unavailable(input.clone()),
            });
        }
    }
    assets
}

#[async_trait]
impl QuoteProvider for CmeProvider {
    fn id(&self) -> &'static str {
        CME_PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Commodity],
            markets: vec!["CME"],
        }
    }

    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError> {
        self.ensure_supported(asset_type)?;

        let mut assets = Vec::new();
        let mut requested: HashMap<&'static str, Vec<&String>> = HashMap::new();
        let mut product_ids: Vec<u32> = Vec::new();
        for symbol in symbols {
            let parts = SymbolParts::parse(symbol);
            match cme_product(&parts.short_symbol) {
                Some(product) => {
                    if !product_ids.contains(&product.id) {
                        product_ids.push(product.id);
                    }
                    requested.entry(product.code).or_default().push(symbol);
                }
                None => assets.push(Asset::unavailable(symbol.clone())),
            }
        }
        if product_ids.is_empty() {
            return Ok(assets);
        }

        let ids = product_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let quotes: Vec<CmeQuote> = self
            .client
            .get(&self.front_months_url)
            .query(&[("productIds", ids.as_str()), ("venue", "G"), ("type", "VOLUME")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("CME returned {} front-month quotes", quotes.len());

        assets.extend(map_quotes(quotes, &mut requested));
        Ok(assets)
    }
}
