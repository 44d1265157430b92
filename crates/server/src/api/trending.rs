//! Trending API handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use flickvault_core::TrendingItem;
use serde::Serialize;
use tracing::error;

use super::response::{internal_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub trending_items: Vec<TrendingItem>,
}

/// GET /api/v1/trending
///
/// Trending movies and shows in feed order, refreshing the cache first when
/// it has gone stale.
pub async fn get_trending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrendingResponse>, ApiError> {
    match state.trending().get_trending().await {
        Ok(trending_items) => Ok(Json(TrendingResponse { trending_items })),
        Err(e) => {
            error!("Failed to serve trending items: {}", e);
            Err(internal_error())
        }
    }
}
