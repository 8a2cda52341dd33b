//! Symbol normalization, parsing and validation.
//!
//! All functions here are pure: they never fail and never touch the network.
//! Acceptance of a symbol is decided by [`SymbolParts::is_valid`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::SymbolParts;

lazy_static! {
    /// Market prefix: up to 10 alphanumerics (may be empty)
    static ref MARKET_CODE_PATTERN: Regex = Regex::new(r"^[A-Z0-9]{0,10}$").unwrap();
    /// Short symbol: tickers, ISINs and pair notations such as BRK.B or BTC/USD
    static ref SHORT_SYMBOL_PATTERN: Regex = Regex::new(r"^[A-Z0-9.+_/-]{1,12}$").unwrap();
    static ref ISIN_PATTERN: Regex = Regex::new(r"^[A-Z0-9]{12}$").unwrap();
    static ref MIC_PATTERN: Regex = Regex::new(r"^[A-Z]{4}$").unwrap();
}

/// Trim surrounding whitespace and upper-case a raw symbol.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Split a symbol on its first `:`.
///
/// Without a `:` the market code is empty and the short symbol is the
/// input unchanged.
pub fn parse_symbol(symbol: &str) -> SymbolParts {
    match symbol.split_once(':') {
        Some((market, short)) => SymbolParts::new(market, short),
        None => SymbolParts::new("", symbol),
    }
}

/// True iff `symbol` is a 12-character alphanumeric identifier.
pub fn is_valid_isin(symbol: &str) -> bool {
    ISIN_PATTERN.is_match(&symbol.to_ascii_uppercase())
}

/// True iff `code` is exactly four letters.
pub fn is_valid_mic(code: &str) -> bool {
    MIC_PATTERN.is_match(&code.to_ascii_uppercase())
}

impl SymbolParts {
    /// Parse an already-normalized symbol. See [`parse_symbol`].
    pub fn parse(symbol: &str) -> Self {
        parse_symbol(symbol)
    }

    /// Check both parts against the accepted symbol grammar (case-insensitive).
    pub fn is_valid(&self) -> bool {
        MARKET_CODE_PATTERN.is_match(&self.market_code.to_ascii_uppercase())
            && SHORT_SYMBOL_PATTERN.is_match(&self.short_symbol.to_ascii_uppercase())
    }
}
