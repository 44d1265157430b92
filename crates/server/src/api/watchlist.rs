//! Per-user watchlist handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use flickvault_core::{catalog::MediaSummary, MediaType, UserError};
use serde::Serialize;
use tracing::error;

use super::middleware::AuthUser;
use super::response::{api_error, ApiError, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub success: bool,
    pub watchlist: Vec<MediaSummary>,
}

fn media_label(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "Movie",
        MediaType::Tv => "TV show",
    }
}

fn update_failed() -> ApiError {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Can't update watchlist please try again",
    )
}

/// GET /api/v1/user/watchlist
///
/// Summaries in insertion order. Ids no longer in the catalog are skipped.
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let retrieve_failed = || {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Can't retrieve watchlist please try again",
        )
    };

    let ids = state.users().watchlist(&user_id).map_err(|e| {
        error!("Failed to read watchlist for {}: {}", user_id, e);
        retrieve_failed()
    })?;

    let mut watchlist = Vec::with_capacity(ids.len());
    for id in ids {
        match state.catalog().get_summary(&id) {
            Ok(Some(summary)) => watchlist.push(summary),
            Ok(None) => {}
            Err(e) => {
                error!("Failed to resolve watchlist item {}: {}", id, e);
                return Err(retrieve_failed());
            }
        }
    }

    Ok(Json(WatchlistResponse {
        success: true,
        watchlist,
    }))
}

/// POST /api/v1/user/watchlist/{id}
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let summary = match state.catalog().get_summary(&id) {
        Ok(Some(summary)) => summary,
        Ok(None) => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                "No movie or TV show found with given id",
            ))
        }
        Err(e) => {
            error!("Failed to look up {}: {}", id, e);
            return Err(update_failed());
        }
    };
    let label = media_label(summary.media_type);

    match state.users().add_to_watchlist(&user_id, &id) {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(format!(
                "{label} added to watchlist successfully"
            ))),
        )),
        Err(UserError::AlreadyInWatchlist(_)) => Err(api_error(
            StatusCode::CONFLICT,
            format!("{label} already exists in watchlist"),
        )),
        Err(e) => {
            error!("Failed to add {} to watchlist of {}: {}", id, user_id, e);
            Err(update_failed())
        }
    }
}

/// DELETE /api/v1/user/watchlist/{id}
///
/// Succeeds whether or not the item was on the list.
pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let label = match state.catalog().get_summary(&id) {
        Ok(Some(summary)) => media_label(summary.media_type),
        Ok(None) => "Item",
        Err(e) => {
            error!("Failed to look up {}: {}", id, e);
            "Item"
        }
    };

    match state.users().remove_from_watchlist(&user_id, &id) {
        Ok(_) => Ok(Json(MessageResponse::new(format!(
            "{label} removed from watchlist successfully"
        )))),
        Err(e) => {
            error!("Failed to remove {} from watchlist of {}: {}", id, user_id, e);
            Err(update_failed())
        }
    }
}
