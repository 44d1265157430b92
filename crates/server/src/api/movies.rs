//! Movie API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use flickvault_core::catalog::{MediaLinks, MediaSummary, MovieDetails};
use serde::{Deserialize, Serialize};

use super::response::{api_error, catalog_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Page number from the query string. An unparseable page is a page that does not exist.
pub fn requested_page(
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<u32, ApiError> {
    match params {
        Ok(Query(params)) => Ok(params.page),
        Err(_) => Err(api_error(StatusCode::NOT_FOUND, "Page not found")),
    }
}

#[derive(Debug, Deserialize)]
pub struct TitleParams {
    pub title: Option<String>,
}

impl TitleParams {
    pub fn required(self) -> Result<String, ApiError> {
        self.title.ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "title query parameter is required",
            )
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListResponse {
    pub total_movies: u64,
    pub total_pages: u32,
    pub movies: Vec<MediaSummary>,
}

#[derive(Debug, Serialize)]
pub struct CastResponse {
    pub cast: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/movies?page=N
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let page = state
        .catalog()
        .list_movies(requested_page(params)?)
        .map_err(|e| catalog_error(e, "Page not found"))?;

    Ok(Json(MovieListResponse {
        total_movies: page.total,
        total_pages: page.total_pages,
        movies: page.items,
    }))
}

/// GET /api/v1/movies/search?title=
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleParams>,
) -> Result<Json<Vec<MediaSummary>>, ApiError> {
    let title = params.required()?;
    let movies = state
        .catalog()
        .search_movies(&title)
        .map_err(|e| catalog_error(e, "No movies found"))?;

    if movies.is_empty() {
        return Err(api_error(StatusCode::NOT_FOUND, "No movies found"));
    }
    Ok(Json(movies))
}

/// GET /api/v1/movies/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetails>, ApiError> {
    state
        .catalog()
        .get_movie(&id)
        .map(|movie| Json(MovieDetails::from(movie)))
        .map_err(|e| catalog_error(e, "Movie not found"))
}

/// GET /api/v1/movies/urls/{id}
pub async fn get_movie_urls(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MediaLinks>, ApiError> {
    state
        .catalog()
        .movie_urls(&id)
        .map(Json)
        .map_err(|e| catalog_error(e, "Movie not found"))
}

/// GET /api/v1/movies/cast/{id}
pub async fn get_movie_cast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CastResponse>, ApiError> {
    state
        .catalog()
        .movie_cast(&id)
        .map(|cast| Json(CastResponse { cast }))
        .map_err(|e| catalog_error(e, "Movie not found"))
}
