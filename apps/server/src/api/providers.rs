use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use quotefeed_market_data::{AssetType, MarketConflict};
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderInfo {
    id: &'static str,
    asset_types: Vec<AssetType>,
    markets: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultRouteInfo {
    asset_type: AssetType,
    isin: Option<String>,
    mic: Option<String>,
    generic: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProvidersResponse {
    providers: Vec<ProviderInfo>,
    default_routes: Vec<DefaultRouteInfo>,
    conflicts: Vec<MarketConflict>,
    cache_entries: u64,
    started_at: DateTime<Utc>,
}

async fn get_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let registry = &state.registry;
    let providers = registry
        .providers()
        .iter()
        .map(|provider| ProviderInfo {
            id: provider.id(),
            asset_types: provider.capabilities().asset_types.to_vec(),
            markets: registry.markets_of(provider.id()),
        })
        .collect();
    let default_routes = registry
        .routes()
        .iter()
        .map(|(asset_type, route)| DefaultRouteInfo {
            asset_type,
            isin: route.isin.clone(),
            mic: route.mic.clone(),
            generic: route.generic.clone(),
        })
        .collect();

    Json(ProvidersResponse {
        providers,
        default_routes,
        conflicts: registry.conflicts().to_vec(),
        cache_entries: state.cache.stats().entry_count,
        started_at: state.started_at,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/providers", get(get_providers))
}
