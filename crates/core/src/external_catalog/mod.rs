//! External catalog integration (TMDB).
//!
//! Supplies the weekly trending feed and the per-title IMDb id lookups used
//! to reconcile feed entries against the local catalog.

mod tmdb;
mod types;

pub use tmdb::TmdbClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::MediaType;

/// Errors that can occur when interacting with external catalogs.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of trending titles.
#[async_trait]
pub trait TrendingFeed: Send + Sync {
    /// Fetch this week's trending entries in rank order.
    async fn fetch_trending(&self) -> Result<Vec<TrendingFeedEntry>, ExternalCatalogError>;

    /// Resolve a title's IMDb id. `Ok(None)` when the title has none.
    async fn fetch_imdb_id(
        &self,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<Option<String>, ExternalCatalogError>;
}

/// Feed used when no TMDB credentials are configured.
pub struct DisabledTrendingFeed;

#[async_trait]
impl TrendingFeed for DisabledTrendingFeed {
    async fn fetch_trending(&self) -> Result<Vec<TrendingFeedEntry>, ExternalCatalogError> {
        Err(ExternalCatalogError::NotConfigured(
            "TMDB client not configured".to_string(),
        ))
    }

    async fn fetch_imdb_id(
        &self,
        _media_type: MediaType,
        _tmdb_id: u64,
    ) -> Result<Option<String>, ExternalCatalogError> {
        Err(ExternalCatalogError::NotConfigured(
            "TMDB client not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_feed_reports_not_configured() {
        let feed = DisabledTrendingFeed;
        assert!(matches!(
            feed.fetch_trending().await,
            Err(ExternalCatalogError::NotConfigured(_))
        ));
        assert!(matches!(
            feed.fetch_imdb_id(MediaType::Movie, 1).await,
            Err(ExternalCatalogError::NotConfigured(_))
        ));
    }
}
