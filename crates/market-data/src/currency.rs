//! Minor-unit currency normalization.
//!
//! Some venues quote in the minor unit of a currency (London in pence,
//! Johannesburg in cents, Tel Aviv in agorot). Quotes are rewritten to the
//! major unit before they are cached or returned.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::Asset;

#[derive(Debug, Clone)]
pub struct CurrencyNormalizationRule {
    pub major_code: &'static str,
    /// Number of minor units per major unit
    pub divisor: f64,
    pub label: &'static str,
}

static CURRENCY_RULES: OnceLock<HashMap<&'static str, CurrencyNormalizationRule>> = OnceLock::new();

fn get_rules() -> &'static HashMap<&'static str, CurrencyNormalizationRule> {
    CURRENCY_RULES.get_or_init(|| {
        let pence = CurrencyNormalizationRule {
            major_code: "GBP",
            divisor: 100.0,
            label: "Pence",
        };
        let cents = CurrencyNormalizationRule {
            major_code: "ZAR",
            divisor: 100.0,
            label: "SA Cents",
        };

        let mut map = HashMap::new();
        map.insert("GBp", pence.clone());
        map.insert("GBX", pence);
        map.insert("ZAc", cents.clone());
        map.insert("ZAC", cents);
        map.insert(
            "ILA",
            CurrencyNormalizationRule {
                major_code: "ILS",
                divisor: 100.0,
                label: "Agorot",
            },
        );
        map
    })
}

/// Returns the normalization rule for a given currency code, if one exists.
///
/// Lookup is case-sensitive: `GBp` is pence while `GBP` is pounds.
pub fn get_normalization_rule(code: &str) -> Option<&'static CurrencyNormalizationRule> {
    get_rules().get(code)
}

/// Converts an amount from its potentially minor unit into its major unit equivalent
/// and returns the normalized major currency code.
pub fn normalize_amount(amount: f64, currency: &str) -> (f64, &str) {
    match get_normalization_rule(currency) {
        Some(rule) => (amount / rule.divisor, rule.major_code),
        None => (amount, currency),
    }
}

/// Rewrite a quote expressed in a minor currency unit to the major unit.
///
/// Quotes without a currency, or in a currency without a rule, are returned
/// untouched. A missing price keeps the currency rewrite.
pub fn normalize_asset(mut asset: Asset) -> Asset {
    let Some(rule) = asset.currency.as_deref().and_then(get_normalization_rule) else {
        return asset;
    };
    asset.price = asset.price.map(|price| price / rule.divisor);
    asset.currency = Some(rule.major_code.to_string());
    asset
}
