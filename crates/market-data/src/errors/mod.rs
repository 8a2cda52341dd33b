//! Error types for the quote aggregation engine.
//!
//! [`QuoteError`] is the single error enum shared by the registry, the
//! aggregator and every provider adapter. Transport layers treat any
//! `QuoteError` as a known failure whose message may be shown to clients.

use thiserror::Error;

use crate::models::AssetType;

/// Errors that can occur while resolving or fetching quotes.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// No provider can serve the requested asset type.
    /// Raised by the registry when an asset type has no usable default route,
    /// and by adapters asked for an asset type outside their capabilities.
    #[error("Asset type not supported: {0}")]
    AssetTypeNotSupported(AssetType),

    /// A single symbol is structurally invalid for a provider.
    #[error("Symbol not supported: {0}")]
    SymbolNotSupported(String),

    /// A provider could not produce a quote for one symbol.
    #[error("Could not get quote for symbol: {0}")]
    SymbolQuote(String),

    /// A provider-specific failure (bad status, unexpected payload, missing credentials).
    #[error("Provider error: {provider} - {message}")]
    Provider {
        /// The provider that failed
        provider: String,
        /// Description of the failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl QuoteError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error reports an unsupported asset type rather than an upstream failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::AssetTypeNotSupported(_) | Self::SymbolNotSupported(_)
        )
    }
}
