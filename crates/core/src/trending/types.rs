//! Types for the trending cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogRecord, MediaType};
use crate::external_catalog::ExternalCatalogError;

/// A catalog record snapshotted into the trending cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_air_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// 1-based position in the stored set, following feed order.
    #[serde(skip)]
    pub rank: u32,
    /// Refresh timestamp shared by every item of one refresh.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl TrendingItem {
    pub fn from_record(record: CatalogRecord, rank: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            banner_url: record.banner_url,
            release_date: record.release_date,
            first_air_date: record.first_air_date,
            last_air_date: record.last_air_date,
            rated: record.rated,
            rating: record.rating,
            media_type: record.media_type,
            rank,
            created_at,
        }
    }
}

/// Outcome of one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Entries returned by the feed, including ones the catalog cannot hold.
    pub feed_entries: usize,
    /// External id lookups that errored or timed out.
    pub lookups_failed: usize,
    /// Entries without an IMDb id or without a local record.
    pub misses: usize,
    /// Items written to the cache.
    pub stored: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Errors from the trending cache.
#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Trending feed fetch failed: {0}")]
    UpstreamFetch(#[from] ExternalCatalogError),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<CatalogError> for TrendingError {
    fn from(e: CatalogError) -> Self {
        TrendingError::Store(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_projection_only() {
        let record = CatalogRecord {
            id: "show-1".to_string(),
            media_type: MediaType::Tv,
            title: "Dark".to_string(),
            banner_url: Some("banner.jpg".to_string()),
            release_date: None,
            first_air_date: NaiveDate::from_ymd_opt(2017, 12, 1),
            last_air_date: NaiveDate::from_ymd_opt(2020, 6, 27),
            rating: Some(8.7),
            rated: Some("TV-MA".to_string()),
        };
        let item = TrendingItem::from_record(record, 1, Utc::now());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "show-1");
        assert_eq!(json["type"], "tv");
        assert_eq!(json["bannerUrl"], "banner.jpg");
        assert_eq!(json["firstAirDate"], "2017-12-01");
        assert_eq!(json["rated"], "TV-MA");
        assert!(json.get("releaseDate").is_none());
        assert!(json.get("createdAt").is_none());
        assert!(json.get("rank").is_none());
    }
}
