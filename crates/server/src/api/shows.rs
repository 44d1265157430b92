//! TV show API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use flickvault_core::catalog::{MediaLinks, MediaSummary, ShowDetails};
use serde::Serialize;

use super::movies::{requested_page, CastResponse, PageParams, TitleParams};
use super::response::{api_error, catalog_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowListResponse {
    pub total_tv_shows: u64,
    pub total_pages: u32,
    pub tv_shows: Vec<MediaSummary>,
}

/// GET /api/v1/tvshows?page=N
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<ShowListResponse>, ApiError> {
    let page = state
        .catalog()
        .list_shows(requested_page(params)?)
        .map_err(|e| catalog_error(e, "Page not found"))?;

    Ok(Json(ShowListResponse {
        total_tv_shows: page.total,
        total_pages: page.total_pages,
        tv_shows: page.items,
    }))
}

/// GET /api/v1/tvshows/search?title=
pub async fn search_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleParams>,
) -> Result<Json<Vec<MediaSummary>>, ApiError> {
    let title = params.required()?;
    let shows = state
        .catalog()
        .search_shows(&title)
        .map_err(|e| catalog_error(e, "No shows found"))?;

    if shows.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "No shows found"));
    }
    Ok(Json(shows))
}

/// GET /api/v1/tvshows/{id}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShowDetails>, ApiError> {
    state
        .catalog()
        .get_show(&id)
        .map(|show| Json(ShowDetails::from(show)))
        .map_err(|e| catalog_error(e, "TV show not found"))
}

/// GET /api/v1/tvshows/urls/{id}
pub async fn get_show_urls(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MediaLinks>, ApiError> {
    state
        .catalog()
        .show_urls(&id)
        .map(Json)
        .map_err(|e| catalog_error(e, "TV show not found"))
}

/// GET /api/v1/tvshows/cast/{id}
pub async fn get_show_cast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CastResponse>, ApiError> {
    state
        .catalog()
        .show_cast(&id)
        .map(|cast| Json(CastResponse { cast }))
        .map_err(|e| catalog_error(e, "TV show not found"))
}
