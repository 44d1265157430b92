//! Combined movie and show search.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use flickvault_core::catalog::MediaSummary;

use super::movies::TitleParams;
use super::response::{api_error, catalog_error, ApiError};
use crate::state::AppState;

/// GET /api/v1/media?title=
///
/// Movies first, then shows.
pub async fn search_media(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleParams>,
) -> Result<Json<Vec<MediaSummary>>, ApiError> {
    let title = params.required()?;
    let catalog = state.catalog();

    let mut results = catalog
        .search_movies(&title)
        .map_err(|e| catalog_error(e, "No movies or shows found"))?;
    results.extend(
        catalog
            .search_shows(&title)
            .map_err(|e| catalog_error(e, "No movies or shows found"))?,
    );

    if results.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "No movies or shows found"));
    }
    Ok(Json(results))
}
