//! Trending cache.
//!
//! Keeps a snapshot of the catalog records that match this week's trending
//! feed. The snapshot is rebuilt wholesale once the newest item is older
//! than the freshness window; readers in between are served from storage.

mod cache;
mod sqlite;
mod types;

pub use cache::{TrendingCache, TrendingSettings};
pub use sqlite::SqliteTrendingStore;
pub use types::*;

use chrono::{DateTime, Utc};

/// Trait for trending item storage.
pub trait TrendingStore: Send + Sync {
    /// Creation time of the newest stored item, `None` when empty.
    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, TrendingError>;

    /// All stored items in rank order.
    fn list(&self) -> Result<Vec<TrendingItem>, TrendingError>;

    /// Atomically replace the stored set.
    fn replace_all(&self, items: &[TrendingItem]) -> Result<(), TrendingError>;

    fn count(&self) -> Result<u64, TrendingError>;
}
