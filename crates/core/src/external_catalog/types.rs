//! Types returned by the trending feed.

use serde::{Deserialize, Serialize};

use crate::catalog::MediaType;

/// One ranked entry of the weekly trending feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingFeedEntry {
    /// Raw media type tag ("movie", "tv", "person", ...).
    pub media_type: String,
    /// TMDB numeric id.
    pub tmdb_id: u64,
}

impl TrendingFeedEntry {
    pub fn new(media_type: impl Into<String>, tmdb_id: u64) -> Self {
        Self {
            media_type: media_type.into(),
            tmdb_id,
        }
    }

    /// Catalog type this entry maps to, or `None` for tags the catalog does not hold.
    pub fn catalog_type(&self) -> Option<MediaType> {
        self.media_type.parse().ok()
    }
}
