//! Symbol resolution.
//!
//! Turns raw caller input into [`SymbolParts`](crate::models::SymbolParts)
//! and decides which symbols are acceptable:
//!
//! ```text
//! "  xlon:vod "  --normalize-->  "XLON:VOD"  --parse-->  { market_code: "XLON", short_symbol: "VOD" }
//! ```
//!
//! It also carries the MIC to Yahoo suffix table used by the Yahoo adapter.

mod exchange_suffixes;
mod symbol;

pub use exchange_suffixes::{
    yahoo_markets, yahoo_suffix_for_mic, yahoo_symbol, YAHOO_EXCHANGE_SUFFIXES,
};
pub use symbol::{is_valid_isin, is_valid_mic, normalize_symbol, parse_symbol};
