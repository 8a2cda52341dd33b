//! Yahoo Finance API response models.
//!
//! Only the fields of the v7 quote endpoint that the provider reads.

use serde::Deserialize;

/// Main response wrapper for the v7 quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    pub quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteResult {
    #[serde(default)]
    pub result: Vec<YahooQuote>,
    // Note: error field exists in API but failures are reported via HTTP status
}

/// Individual quote from the v7 quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuote {
    pub symbol: String,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
}
