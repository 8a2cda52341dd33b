//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that every upstream adapter implements
//! - Provider capabilities (asset types and owned market codes)
//! - Built-in adapters (Yahoo, Binance, Coinbase, CME, Fixer)
//!
//! Adapters receive normalized symbols (`MARKET:SHORT` or `SHORT`) and do
//! their own network I/O. They are treated as unreliable: the aggregator
//! isolates a failing adapter from the rest of a batch.

mod capabilities;
mod traits;

pub mod binance;
pub mod cme;
pub mod coinbase;
pub mod fixer;
pub mod yahoo;

use std::time::Duration;

use reqwest::Client;

use crate::errors::QuoteError;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use traits::QuoteProvider;

/// Default HTTP request timeout
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("quotefeed/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the built-in adapters.
///
/// Fails when the TLS backend cannot be initialized.
pub(crate) fn http_client() -> Result<Client, QuoteError> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}
