/// Provider identifier - static constants such as "YAHOO" or "BINANCE"
pub type ProviderId = &'static str;
