//! JSON envelopes shared by the API handlers.

use axum::{http::StatusCode, Json};
use flickvault_core::CatalogError;
use serde::Serialize;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Body of mutations that only report an outcome.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
}

/// 500 with a generic message; the cause is logged by the caller.
pub fn internal_error() -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Map a catalog failure, answering `NotFound` with 404 and `not_found`.
pub fn catalog_error(e: CatalogError, not_found: &str) -> ApiError {
    match e {
        CatalogError::NotFound(_) => api_error(StatusCode::NOT_FOUND, not_found),
        e => {
            error!("Catalog error: {}", e);
            internal_error()
        }
    }
}
