//! Mock trending feed for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::MediaType;
use crate::external_catalog::{ExternalCatalogError, TrendingFeed, TrendingFeedEntry};

/// A recorded feed call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedFeedCall {
    FetchTrending,
    FetchImdbId { media_type: MediaType, tmdb_id: u64 },
}

/// Mock implementation of the TrendingFeed trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable ranked feed and IMDb id mapping
/// - Fail individual lookups or the next feed fetch
/// - Delay feed fetches to exercise concurrent readers
/// - Track calls for assertions
///
/// # Example
///
/// ```rust,ignore
/// use flickvault_core::testing::MockTrendingFeed;
///
/// let feed = MockTrendingFeed::new();
/// feed.set_entries(vec![TrendingFeedEntry::new("tv", 202)]).await;
/// feed.set_imdb_id(MediaType::Tv, 202, "tt777").await;
/// ```
#[derive(Debug)]
pub struct MockTrendingFeed {
    entries: Arc<RwLock<Vec<TrendingFeedEntry>>>,
    imdb_ids: Arc<RwLock<HashMap<(MediaType, u64), String>>>,
    failing_lookups: Arc<RwLock<HashSet<(MediaType, u64)>>>,
    /// If set, the next feed fetch will fail with this error.
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<RecordedFeedCall>>>,
}

impl Default for MockTrendingFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrendingFeed {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            imdb_ids: Arc::new(RwLock::new(HashMap::new())),
            failing_lookups: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the ranked feed.
    pub async fn set_entries(&self, entries: Vec<TrendingFeedEntry>) {
        *self.entries.write().await = entries;
    }

    /// Map a TMDB id to an IMDb id.
    pub async fn set_imdb_id(&self, media_type: MediaType, tmdb_id: u64, imdb_id: &str) {
        self.imdb_ids
            .write()
            .await
            .insert((media_type, tmdb_id), imdb_id.to_string());
    }

    /// Make every lookup of this title fail.
    pub async fn fail_lookup(&self, media_type: MediaType, tmdb_id: u64) {
        self.failing_lookups
            .write()
            .await
            .insert((media_type, tmdb_id));
    }

    /// Set an error to be returned by the next feed fetch.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every feed fetch by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub async fn recorded_calls(&self) -> Vec<RecordedFeedCall> {
        self.calls.read().await.clone()
    }

    pub async fn trending_fetch_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedFeedCall::FetchTrending))
            .count()
    }

    pub async fn lookup_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedFeedCall::FetchImdbId { .. }))
            .count()
    }

    async fn record(&self, call: RecordedFeedCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl TrendingFeed for MockTrendingFeed {
    async fn fetch_trending(&self) -> Result<Vec<TrendingFeedEntry>, ExternalCatalogError> {
        self.record(RecordedFeedCall::FetchTrending).await;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.entries.read().await.clone())
    }

    async fn fetch_imdb_id(
        &self,
        media_type: MediaType,
        tmdb_id: u64,
    ) -> Result<Option<String>, ExternalCatalogError> {
        self.record(RecordedFeedCall::FetchImdbId {
            media_type,
            tmdb_id,
        })
        .await;

        if self
            .failing_lookups
            .read()
            .await
            .contains(&(media_type, tmdb_id))
        {
            return Err(ExternalCatalogError::ApiError {
                status: 500,
                message: format!("lookup failed for {media_type} {tmdb_id}"),
            });
        }

        Ok(self.imdb_ids.read().await.get(&(media_type, tmdb_id)).cloned())
    }
}
