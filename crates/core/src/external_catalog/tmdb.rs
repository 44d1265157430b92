//! TMDB (The Movie Database) API client.
//!
//! TMDB requires an API key for access.
//! Rate limits are generous (around 40 requests per second).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use super::{ExternalCatalogError, TrendingFeed, TrendingFeedEntry};
use crate::catalog::MediaType;
use crate::config::TmdbConfig;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB API client.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: &TmdbConfig) -> Result<Self, ExternalCatalogError> {
        if config.api_key.is_empty() {
            return Err(ExternalCatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch the weekly trending list across all media types.
    pub async fn trending_week(&self) -> Result<Vec<TrendingFeedEntry>, ExternalCatalogError> {
        let url = format!("{}/trending/all/week", self.base_url);

        debug!("TMDB trending fetch");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let response = Self::check_status(response, "trending feed").await?;

        let trending: TmdbTrendingResponse = response.json().await.map_err(|e| {
            ExternalCatalogError::ParseError(format!("Failed to parse trending response: {}", e))
        })?;

        Ok(trending.results.into_iter().map(|r| r.into()).collect())
    }

    /// Get the external ids of a movie or TV series.
    pub async fn external_imdb_id(
        &self,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<Option<String>, ExternalCatalogError> {
        let url = format!(
            "{}/{}/{}/external_ids",
            self.base_url,
            media_type.as_str(),
            tmdb_id
        );

        debug!("TMDB external ids: type={}, id={}", media_type, tmdb_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", &self.api_key)])
            .send()
            .await?;

        let response =
            Self::check_status(response, &format!("{} ID {}", media_type, tmdb_id)).await?;

        let ids: TmdbExternalIdsResponse = response.json().await.map_err(|e| {
            ExternalCatalogError::ParseError(format!(
                "Failed to parse external ids response: {}",
                e
            ))
        })?;

        Ok(ids.imdb_id.filter(|id| !id.is_empty()))
    }

    async fn check_status(
        response: Response,
        resource: &str,
    ) -> Result<Response, ExternalCatalogError> {
        let status = response.status();
        if status == 401 {
            return Err(ExternalCatalogError::NotConfigured(
                "Invalid TMDB API key".to_string(),
            ));
        }
        if status == 404 {
            return Err(ExternalCatalogError::NotFound(resource.to_string()));
        }
        if status == 429 {
            return Err(ExternalCatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExternalCatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TrendingFeed for TmdbClient {
    async fn fetch_trending(&self) -> Result<Vec<TrendingFeedEntry>, ExternalCatalogError> {
        self.trending_week().await
    }

    async fn fetch_imdb_id(
        &self,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<Option<String>, ExternalCatalogError> {
        self.external_imdb_id(media_type, tmdb_id).await
    }
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbTrendingResponse {
    #[serde(default)]
    results: Vec<TmdbTrendingResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbTrendingResult {
    id: u64,
    #[serde(default)]
    media_type: String,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIdsResponse {
    imdb_id: Option<String>,
}

impl From<TmdbTrendingResult> for TrendingFeedEntry {
    fn from(r: TmdbTrendingResult) -> Self {
        Self {
            media_type: r.media_type,
            tmdb_id: r.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, base_url: Option<&str>) -> TmdbConfig {
        TmdbConfig {
            api_key: api_key.to_string(),
            base_url: base_url.map(str::to_string),
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = TmdbClient::new(&config("", None));
        assert!(matches!(result, Err(ExternalCatalogError::NotConfigured(_))));
    }

    #[test]
    fn test_new_trims_base_url() {
        let client = TmdbClient::new(&config("key", Some("http://localhost:9999/3/"))).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/3");

        let client = TmdbClient::new(&config("key", None)).unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_trending_response_parsing() {
        let json = r#"{
            "page": 1,
            "results": [
                {"id": 693134, "media_type": "movie", "title": "Dune: Part Two"},
                {"id": 1396, "media_type": "tv", "name": "Breaking Bad"},
                {"id": 287, "media_type": "person", "name": "Brad Pitt"}
            ]
        }"#;

        let response: TmdbTrendingResponse = serde_json::from_str(json).unwrap();
        let entries: Vec<TrendingFeedEntry> =
            response.results.into_iter().map(|r| r.into()).collect();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], TrendingFeedEntry::new("movie", 693134));
        assert_eq!(entries[1].catalog_type(), Some(MediaType::Tv));
        assert_eq!(entries[2].catalog_type(), None);
    }

    #[test]
    fn test_external_ids_parsing() {
        let with_id: TmdbExternalIdsResponse =
            serde_json::from_str(r#"{"id": 1396, "imdb_id": "tt0903747", "tvdb_id": 81189}"#)
                .unwrap();
        assert_eq!(with_id.imdb_id.as_deref(), Some("tt0903747"));

        let without_id: TmdbExternalIdsResponse =
            serde_json::from_str(r#"{"id": 1, "imdb_id": null}"#).unwrap();
        assert!(without_id.imdb_id.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let client = TmdbClient::new(&config("key", Some("http://127.0.0.1:1"))).unwrap();
        let result = client.fetch_trending().await;
        assert!(matches!(result, Err(ExternalCatalogError::HttpError(_))));
    }
}
