//! MIC to Yahoo Finance symbol suffix mapping.
//!
//! Yahoo identifies the listing venue by a ticker suffix ("VOD.L", "SHOP.TO").
//! US venues carry no suffix.

use crate::models::SymbolParts;

/// ISO 10383 MIC and the suffix Yahoo appends for that venue (without the dot).
pub const YAHOO_EXCHANGE_SUFFIXES: &[(&str, &str)] = &[
    // North America
    ("XNAS", ""),
    ("XNGS", ""),
    ("XNYS", ""),
    ("ARCX", ""),
    ("BATS", ""),
    ("XASE", ""),
    ("XTSE", "TO"),
    ("XTSX", "V"),
    ("XCNQ", "CN"),
    ("NEOE", "NE"),
    ("XMEX", "MX"),
    ("BIVA", "MX"),
    // Futures venues
    ("XCBT", "CBT"),
    ("XCME", "CME"),
    ("IFUS", "NYB"),
    ("XNYM", "NYM"),
    // South America
    ("XBUE", "BA"),
    ("BVMF", "SA"),
    ("XSGO", "SN"),
    ("BVCA", "CR"),
    // Europe
    ("XLON", "L"),
    ("XWBO", "VI"),
    ("XBRU", "BR"),
    ("XPRA", "PR"),
    ("XCSE", "CO"),
    ("XTAL", "TL"),
    ("XHEL", "HE"),
    ("XPAR", "PA"),
    ("XBER", "BE"),
    ("XFRA", "F"),
    ("XETR", "DE"),
    ("XHAM", "HM"),
    ("XHAN", "HA"),
    ("XDUS", "DU"),
    ("XMUN", "MU"),
    ("XSTU", "SG"),
    ("XATH", "AT"),
    ("XBUD", "BD"),
    ("XICE", "IC"),
    ("XDUB", "IR"),
    ("ETLX", "TI"),
    ("XMIL", "MI"),
    ("XRIS", "RG"),
    ("NASB", "VS"),
    ("XAMS", "AS"),
    ("XOSL", "OL"),
    ("XLIS", "LS"),
    ("MISX", "ME"),
    ("XMAD", "MC"),
    ("XSTO", "ST"),
    ("XSWX", "SW"),
    ("XIST", "IS"),
    // Middle East & Africa
    ("XCAI", "CA"),
    ("XTAE", "TA"),
    ("DSMD", "QA"),
    ("XSAU", "SAU"),
    ("XJSE", "JO"),
    // Asia-Pacific
    ("XASX", "AX"),
    ("XSHG", "SS"),
    ("XSHE", "SZ"),
    ("XHKG", "HK"),
    ("XBOM", "BO"),
    ("XNSE", "NS"),
    ("XIDX", "JK"),
    ("XTKS", "T"),
    ("XKLS", "KL"),
    ("XNZE", "NZ"),
    ("XSES", "SI"),
    ("XKRX", "KS"),
    ("XKOS", "KQ"),
    ("XTAI", "TW"),
    ("XBKK", "BK"),
];

/// Get the Yahoo suffix for a MIC (`Some("")` for suffix-less US venues).
pub fn yahoo_suffix_for_mic(mic: &str) -> Option<&'static str> {
    YAHOO_EXCHANGE_SUFFIXES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(mic))
        .map(|(_, suffix)| *suffix)
}

/// All MICs Yahoo can quote, used as the provider's market codes.
pub fn yahoo_markets() -> Vec<&'static str> {
    YAHOO_EXCHANGE_SUFFIXES.iter().map(|(mic, _)| *mic).collect()
}

/// Build the Yahoo ticker for parsed symbol parts.
///
/// Unknown or absent market codes leave the short symbol untouched.
pub fn yahoo_symbol(parts: &SymbolParts) -> String {
    match yahoo_suffix_for_mic(&parts.market_code) {
        Some(suffix) if !suffix.is_empty() => format!("{}.{}", parts.short_symbol, suffix),
        _ => parts.short_symbol.clone(),
    }
}
