//! Local movie and TV show catalog.
//!
//! Serves the listing, detail, search and link endpoints, and is the
//! lookup target when reconciling the trending feed.

mod seed;
mod sqlite;
mod types;

pub use seed::{import_seed, import_seed_file, CatalogSeed, SeedSummary};
pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Insert a movie, or replace the movie with the same id.
    fn upsert_movie(&self, movie: NewMovie) -> Result<Movie, CatalogError>;

    /// Insert a show, or replace the show with the same id.
    fn upsert_show(&self, show: NewShow) -> Result<Show, CatalogError>;

    /// List one page of movie summaries (1-based).
    ///
    /// Returns `NotFound` for page 0 or a page past the last one.
    fn list_movies(&self, page: u32) -> Result<Page<MediaSummary>, CatalogError>;

    /// List one page of show summaries (1-based).
    fn list_shows(&self, page: u32) -> Result<Page<MediaSummary>, CatalogError>;

    fn get_movie(&self, id: &str) -> Result<Movie, CatalogError>;

    fn get_show(&self, id: &str) -> Result<Show, CatalogError>;

    /// Movies whose title contains `title`, ignoring case.
    fn search_movies(&self, title: &str) -> Result<Vec<MediaSummary>, CatalogError>;

    /// Shows whose title contains `title`, ignoring case.
    fn search_shows(&self, title: &str) -> Result<Vec<MediaSummary>, CatalogError>;

    fn movie_urls(&self, id: &str) -> Result<MediaLinks, CatalogError>;

    fn show_urls(&self, id: &str) -> Result<MediaLinks, CatalogError>;

    fn movie_cast(&self, id: &str) -> Result<Vec<String>, CatalogError>;

    fn show_cast(&self, id: &str) -> Result<Vec<String>, CatalogError>;

    /// Find the record of the given type carrying this IMDb id.
    fn find_by_imdb_id(
        &self,
        media_type: MediaType,
        imdb_id: &str,
    ) -> Result<Option<CatalogRecord>, CatalogError>;

    /// Summary of a movie or show by id.
    fn get_summary(&self, id: &str) -> Result<Option<MediaSummary>, CatalogError>;

    /// Number of movies and shows.
    fn count(&self) -> Result<CatalogStats, CatalogError>;
}
