use serde::{Deserialize, Serialize};

/// A price quote for a single symbol.
///
/// `price == None` means no quote is available for the symbol, which is
/// distinct from a zero price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Symbol as requested by the caller (or as reported by a provider
    /// before the aggregator rewrites it).
    pub symbol: String,

    /// Last price in `currency` units, or percent of par when `percent_price` is set
    pub price: Option<f64>,

    /// Quote currency (ISO 4217, possibly a minor unit such as GBp before normalization)
    pub currency: Option<String>,

    /// Marks bond quotes expressed as a percentage of face value.
    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_price: Option<bool>,
}

impl Asset {
    /// Create a priced quote.
    pub fn new(symbol: impl Into<String>, price: f64, currency: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: Some(price),
            currency: Some(currency.into()),
            percent_price: None,
        }
    }

    /// Create a quote that carries no price (symbol could not be resolved).
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            currency: None,
            percent_price: None,
        }
    }

    /// Mark the quote as a percent-of-par price.
    pub fn with_percent_price(mut self) -> Self {
        self.percent_price = Some(true);
        self
    }

    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_null_price_and_currency() {
        let json = serde_json::to_value(Asset::unavailable("XETR:FOO")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "symbol": "XETR:FOO", "price": null, "currency": null })
        );
    }

    #[test]
    fn test_percent_price_uses_camel_case() {
        let asset = Asset::new("DE0001102580", 98.75, "EUR").with_percent_price();
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["percentPrice"], serde_json::json!(true));
        assert_eq!(json["price"], serde_json::json!(98.75));
    }

    #[test]
    fn test_zero_price_is_still_a_price() {
        let asset = Asset::new("DELISTED", 0.0, "USD");
        assert!(asset.has_price());
        assert!(!Asset::unavailable("DELISTED").has_price());
    }
}
