use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use quotefeed_market_data::AssetType;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Response header listing providers that failed while serving the request
pub const FAILED_PROVIDERS_HEADER: &str = "x-quote-provider-failures";

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub symbols: Option<Vec<String>>,
}

async fn get_quotes(
    state: Arc<AppState>,
    asset_type: AssetType,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let symbols = match payload {
        Ok(Json(QuoteRequest {
            symbols: Some(symbols),
        })) if !symbols.is_empty() => symbols,
        Ok(_) => return Err(ApiError::invalid_request()),
        Err(rejection) => {
            tracing::debug!("Rejected {} quote request: {}", asset_type, rejection);
            return Err(ApiError::invalid_request());
        }
    };

    let batch = state
        .aggregator
        .get_quotes(&symbols, asset_type)
        .await?
        .into_result(state.failure_policy)?;

    let mut headers = HeaderMap::new();
    if !batch.is_complete() {
        for failure in &batch.failures {
            tracing::warn!("Partial {} quotes: {}", asset_type, failure);
        }
        let failed = batch.failed_providers().join(",");
        if let Ok(value) = HeaderValue::from_str(&failed) {
            headers.insert(FAILED_PROVIDERS_HEADER, value);
        }
    }

    Ok((headers, Json(batch.quotes)).into_response())
}

async fn stock_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::Stock, payload).await
}

async fn bond_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::Bond, payload).await
}

async fn commodity_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::Commodity, payload).await
}

async fn crypto_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::Cryptocurrency, payload).await
}

async fn forex_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::Forex, payload).await
}

async fn mutual_fund_quotes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Response> {
    get_quotes(state, AssetType::MutualFund, payload).await
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stock", post(stock_quotes))
        .route("/bond", post(bond_quotes))
        .route("/commodity", post(commodity_quotes))
        .route("/crypto", post(crypto_quotes))
        .route("/forex", post(forex_quotes))
        .route("/mutualfund", post(mutual_fund_quotes))
}
