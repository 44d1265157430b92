//! Refresh policy and reconciliation workflow for the trending cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{RefreshSummary, TrendingError, TrendingItem, TrendingStore};
use crate::catalog::{CatalogStore, MediaType};
use crate::config::TrendingConfig;
use crate::external_catalog::{ExternalCatalogError, TrendingFeed};
use crate::metrics;

/// Tunables for [`TrendingCache`].
#[derive(Debug, Clone)]
pub struct TrendingSettings {
    /// Age after which the newest cached item makes the cache stale.
    pub freshness: chrono::Duration,
    /// Maximum concurrent external id lookups.
    pub lookup_concurrency: usize,
}

impl Default for TrendingSettings {
    fn default() -> Self {
        Self::from(&TrendingConfig::default())
    }
}

impl From<&TrendingConfig> for TrendingSettings {
    fn from(config: &TrendingConfig) -> Self {
        Self {
            freshness: chrono::Duration::days(config.freshness_days as i64),
            lookup_concurrency: config.lookup_concurrency.max(1),
        }
    }
}

/// Time-invalidated cache of trending catalog records.
pub struct TrendingCache {
    feed: Arc<dyn TrendingFeed>,
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn TrendingStore>,
    settings: TrendingSettings,
    /// Held for the duration of a refresh so concurrent stale readers share one.
    refresh_lock: Mutex<()>,
}

enum LookupOutcome {
    Matched,
    Missing,
    Failed,
}

impl LookupOutcome {
    fn label(&self) -> &'static str {
        match self {
            LookupOutcome::Matched => "matched",
            LookupOutcome::Missing => "missing",
            LookupOutcome::Failed => "failed",
        }
    }
}

impl TrendingCache {
    pub fn new(
        feed: Arc<dyn TrendingFeed>,
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn TrendingStore>,
        settings: TrendingSettings,
    ) -> Self {
        Self {
            feed,
            catalog,
            store,
            settings,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &TrendingSettings {
        &self.settings
    }

    /// Whether the cached set needs a refresh right now.
    pub fn is_stale(&self) -> Result<bool, TrendingError> {
        self.is_stale_at(Utc::now())
    }

    /// Whether the cached set is stale as of `now`. An empty cache is always stale.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> Result<bool, TrendingError> {
        match self.store.latest_created_at()? {
            None => Ok(true),
            Some(created_at) => Ok(created_at < now - self.settings.freshness),
        }
    }

    /// Cached items in rank order, refreshing first when stale.
    ///
    /// A failed refresh falls back to the stale items when there are any.
    pub async fn get_trending(&self) -> Result<Vec<TrendingItem>, TrendingError> {
        if self.is_stale()? {
            if let Err(e) = self.refresh_if_stale().await {
                let cached = self.store.list()?;
                if cached.is_empty() {
                    return Err(e);
                }
                warn!(
                    error = %e,
                    items = cached.len(),
                    "Trending refresh failed, serving stale items"
                );
                metrics::TRENDING_STALE_SERVED.inc();
                return Ok(cached);
            }
        }

        self.store.list()
    }

    /// Refresh unless another caller already did while we waited for the lock.
    ///
    /// Returns `None` when the cache turned out to be fresh.
    pub async fn refresh_if_stale(&self) -> Result<Option<RefreshSummary>, TrendingError> {
        let _guard = self.refresh_lock.lock().await;
        if !self.is_stale()? {
            debug!("Trending cache already refreshed by a concurrent caller");
            return Ok(None);
        }
        self.refresh_locked().await.map(Some)
    }

    /// Unconditionally rebuild the cached set from the feed.
    pub async fn refresh(&self) -> Result<RefreshSummary, TrendingError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<RefreshSummary, TrendingError> {
        let started = Instant::now();
        let result = self.rebuild().await;

        let label = match &result {
            Ok(_) => "success",
            Err(TrendingError::UpstreamFetch(_)) => "upstream_error",
            Err(TrendingError::Store(_)) => "store_error",
        };
        metrics::TRENDING_REFRESHES.with_label_values(&[label]).inc();
        metrics::TRENDING_REFRESH_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(summary) => info!(
                feed_entries = summary.feed_entries,
                lookups_failed = summary.lookups_failed,
                misses = summary.misses,
                stored = summary.stored,
                "Trending cache refreshed"
            ),
            Err(e) => warn!(error = %e, "Trending cache refresh failed"),
        }

        result
    }

    async fn rebuild(&self) -> Result<RefreshSummary, TrendingError> {
        let entries = self.feed.fetch_trending().await?;
        let feed_entries = entries.len();

        let candidates: Vec<(MediaType, u64)> = entries
            .iter()
            .filter_map(|entry| entry.catalog_type().map(|t| (t, entry.tmdb_id)))
            .collect();

        let feed = &self.feed;
        let lookups: Vec<(MediaType, u64, Result<Option<String>, ExternalCatalogError>)> =
            stream::iter(candidates)
                .map(|(media_type, tmdb_id)| async move {
                    let result = feed.fetch_imdb_id(media_type, tmdb_id).await;
                    (media_type, tmdb_id, result)
                })
                .buffered(self.settings.lookup_concurrency)
                .collect()
                .await;

        let refreshed_at = Utc::now();
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut lookups_failed = 0;
        let mut misses = 0;

        for (media_type, tmdb_id, result) in lookups {
            let outcome = match result {
                Ok(Some(imdb_id)) => match self.catalog.find_by_imdb_id(media_type, &imdb_id)? {
                    Some(record) => {
                        if seen.insert(record.id.clone()) {
                            let rank = items.len() as u32 + 1;
                            items.push(TrendingItem::from_record(record, rank, refreshed_at));
                        }
                        LookupOutcome::Matched
                    }
                    None => {
                        debug!(%media_type, tmdb_id, %imdb_id, "No catalog record for trending entry");
                        misses += 1;
                        LookupOutcome::Missing
                    }
                },
                Ok(None) => {
                    debug!(%media_type, tmdb_id, "Trending entry has no IMDb id");
                    misses += 1;
                    LookupOutcome::Missing
                }
                Err(e) => {
                    warn!(%media_type, tmdb_id, error = %e, "External id lookup failed");
                    lookups_failed += 1;
                    LookupOutcome::Failed
                }
            };
            metrics::TRENDING_LOOKUPS
                .with_label_values(&[outcome.label()])
                .inc();
        }

        self.store.replace_all(&items)?;

        Ok(RefreshSummary {
            feed_entries,
            lookups_failed,
            misses,
            stored: items.len(),
            refreshed_at,
        })
    }

    /// Periodically refresh the cache when stale until `shutdown` fires.
    pub fn spawn_refresher(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Trending refresher started");
            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("Trending refresher received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        match self.refresh_if_stale().await {
                            Ok(Some(summary)) => {
                                debug!(stored = summary.stored, "Background trending refresh complete");
                            }
                            Ok(None) => {}
                            Err(e) => warn!("Background trending refresh failed: {}", e),
                        }
                    }
                }
            }
            info!("Trending refresher stopped");
        })
    }
}
