//! Quote provider trait definition.
//!
//! This module defines the capability contract every upstream adapter honors.

use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::models::{Asset, AssetType};

use super::capabilities::ProviderCapabilities;

/// Trait for quote providers.
///
/// Implement this trait to add a new upstream data source. The registry
/// indexes the provider by the market codes in its capabilities, and the
/// aggregator issues at most one [`fetch`](Self::fetch) per provider per batch.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quotefeed_market_data::{Asset, AssetType, ProviderCapabilities, QuoteError, QuoteProvider};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             asset_types: &[AssetType::Stock],
///             markets: vec!["XMYX"],
///         }
///     }
///
///     async fn fetch(&self, asset_type: AssetType, symbols: &[String]) -> Result<Vec<Asset>, QuoteError> {
///         self.ensure_supported(asset_type)?;
///         // ... one upstream request for the whole batch
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Stable across restarts; used as the cache-key prefix.
    fn id(&self) -> &'static str;

    /// Describes the asset types and market codes this provider serves.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch quotes for a batch of normalized symbols (`MARKET:SHORT` or `SHORT`).
    ///
    /// Returns at most one quote per resolvable input; unresolvable inputs may be
    /// omitted or returned with a `None` price. Each returned quote's `symbol`
    /// must be the input symbol it answers. Asset types outside the provider's
    /// capabilities yield [`QuoteError::AssetTypeNotSupported`].
    async fn fetch(
        &self,
        asset_type: AssetType,
        symbols: &[String],
    ) -> Result<Vec<Asset>, QuoteError>;

    /// Reject asset types outside this provider's capabilities.
    fn ensure_supported(&self, asset_type: AssetType) -> Result<(), QuoteError> {
        if self.capabilities().supports(asset_type) {
            Ok(())
        } else {
            Err(QuoteError::AssetTypeNotSupported(asset_type))
        }
    }
}
