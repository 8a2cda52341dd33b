use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotefeed_market_data::QuoteError;
use serde::Serialize;
use thiserror::Error;

/// Message returned for requests without a usable symbol list
pub const INVALID_REQUEST: &str = "Invalid request";
/// Message returned for failures that are not quote errors
pub const GENERIC_ERROR: &str = "Generic error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// Known quote failures; the message is safe to show to clients
    #[error("{0}")]
    Quote(#[from] QuoteError),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid_request() -> Self {
        ApiError::BadRequest(INVALID_REQUEST.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Quote(e) => {
                tracing::debug!("Quote request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            // Internals are logged, never returned
            ApiError::Anyhow(e) => {
                tracing::error!("Unexpected error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR.to_string())
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
