pub mod config;
pub mod metrics;
pub mod routes;
pub mod server;

pub use config::ApiConfig;
pub use routes::AppState;
pub use server::{build_router, ApiServer};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use market_core::wire::OrderResponse;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<market_core::MarketError> for ApiError {
    fn from(err: market_core::MarketError) -> Self {
        match err {
            market_core::MarketError::InvalidPayload(msg) => ApiError::BadRequest(msg),
            market_core::MarketError::InvalidAmount(msg) => ApiError::BadRequest(msg),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Store(detail) | ApiError::Server(detail) => {
                error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        let body = OrderResponse {
            success: false,
            order: None,
            error: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
