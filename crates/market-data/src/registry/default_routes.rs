//! Asset-type default routing table.
//!
//! When a symbol's market code does not name a registered provider, the
//! registry falls back to the route configured for the requested asset type.
//! A route has up to three slots, tried in this order:
//!
//! 1. `isin` - when the short symbol is a valid ISIN
//! 2. `mic` - when the market code is a valid MIC
//! 3. `generic` - otherwise

use std::collections::BTreeMap;
use std::fmt;

use crate::models::AssetType;

/// Provider ids used by the built-in routing table.
pub const YAHOO_PROVIDER_ID: &str = "YAHOO";
pub const BINANCE_PROVIDER_ID: &str = "BINANCE";
pub const COINBASE_PROVIDER_ID: &str = "COINBASE";
pub const CME_PROVIDER_ID: &str = "CME";
pub const FIXER_PROVIDER_ID: &str = "FIXER";

/// One slot of a [`DefaultRoute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteSlot {
    Isin,
    Mic,
    Generic,
}

impl RouteSlot {
    pub const ALL: [RouteSlot; 3] = [RouteSlot::Isin, RouteSlot::Mic, RouteSlot::Generic];

    /// Suffix appended to the route's configuration key (`""`, `"_MIC"`, `"_ISIN"`).
    pub fn config_suffix(&self) -> &'static str {
        match self {
            RouteSlot::Isin => "_ISIN",
            RouteSlot::Mic => "_MIC",
            RouteSlot::Generic => "",
        }
    }
}

impl fmt::Display for RouteSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSlot::Isin => f.write_str("isin"),
            RouteSlot::Mic => f.write_str("mic"),
            RouteSlot::Generic => f.write_str("generic"),
        }
    }
}

/// Default providers for one asset type, by symbol shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultRoute {
    pub isin: Option<String>,
    pub mic: Option<String>,
    pub generic: Option<String>,
}

impl DefaultRoute {
    /// A route with only a generic provider.
    pub fn generic(provider_id: impl Into<String>) -> Self {
        Self {
            generic: Some(provider_id.into()),
            ..Self::default()
        }
    }

    pub fn with_isin(mut self, provider_id: impl Into<String>) -> Self {
        self.isin = Some(provider_id.into());
        self
    }

    pub fn with_mic(mut self, provider_id: impl Into<String>) -> Self {
        self.mic = Some(provider_id.into());
        self
    }

    pub fn slot(&self, slot: RouteSlot) -> Option<&str> {
        match slot {
            RouteSlot::Isin => self.isin.as_deref(),
            RouteSlot::Mic => self.mic.as_deref(),
            RouteSlot::Generic => self.generic.as_deref(),
        }
    }

    pub fn set_slot(&mut self, slot: RouteSlot, provider_id: Option<String>) {
        match slot {
            RouteSlot::Isin => self.isin = provider_id,
            RouteSlot::Mic => self.mic = provider_id,
            RouteSlot::Generic => self.generic = provider_id,
        }
    }

    /// Configured slots in resolution order.
    pub fn slots(&self) -> impl Iterator<Item = (RouteSlot, &str)> {
        RouteSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.slot(slot).map(|id| (slot, id)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots().next().is_none()
    }
}

/// Default route per asset type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultRoutes {
    routes: BTreeMap<AssetType, DefaultRoute>,
}

impl DefaultRoutes {
    /// A table with no routes: only market-code lookups resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table for the bundled providers.
    ///
    /// Bond has no bundled provider and stays unrouted unless configured.
    /// No bundled provider resolves ISINs either, so Stock and MutualFund
    /// leave the `isin` slot empty and ISIN inputs fall through to the
    /// generic Yahoo route, which usually answers them without a price.
    pub fn standard() -> Self {
        Self::empty()
            .with_route(
                AssetType::Stock,
                DefaultRoute::generic(YAHOO_PROVIDER_ID).with_mic(YAHOO_PROVIDER_ID),
            )
            .with_route(AssetType::MutualFund, DefaultRoute::generic(YAHOO_PROVIDER_ID))
            .with_route(
                AssetType::Cryptocurrency,
                DefaultRoute::generic(BINANCE_PROVIDER_ID),
            )
            .with_route(AssetType::Commodity, DefaultRoute::generic(CME_PROVIDER_ID))
            .with_route(AssetType::Forex, DefaultRoute::generic(FIXER_PROVIDER_ID))
    }

    pub fn with_route(mut self, asset_type: AssetType, route: DefaultRoute) -> Self {
        self.set_route(asset_type, route);
        self
    }

    /// Replace the route for an asset type. An empty route removes it.
    pub fn set_route(&mut self, asset_type: AssetType, route: DefaultRoute) {
        if route.is_empty() {
            self.routes.remove(&asset_type);
        } else {
            self.routes.insert(asset_type, route);
        }
    }

    /// Set or clear a single slot of an asset type's route.
    pub fn set_slot(&mut self, asset_type: AssetType, slot: RouteSlot, provider_id: Option<String>) {
        let mut route = self.routes.remove(&asset_type).unwrap_or_default();
        route.set_slot(slot, provider_id);
        self.set_route(asset_type, route);
    }

    pub fn route(&self, asset_type: AssetType) -> Option<&DefaultRoute> {
        self.routes.get(&asset_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetType, &DefaultRoute)> {
        self.routes.iter().map(|(asset_type, route)| (*asset_type, route))
    }
}
