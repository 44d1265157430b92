//! Testing utilities and mock implementations.
//!
//! Provides a mock trending feed so the trending cache and the HTTP API can
//! be exercised without network access, plus fixture builders for catalog
//! records.
//!
//! # Example
//!
//! ```rust,ignore
//! use flickvault_core::testing::{fixtures, MockTrendingFeed};
//!
//! let feed = MockTrendingFeed::new();
//! let movie = fixtures::new_movie("Heat", "tt0113277");
//! ```

mod mock_trending_feed;

pub use mock_trending_feed::{MockTrendingFeed, RecordedFeedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::catalog::{NewMovie, NewShow};

    fn imdb(imdb_id: &str) -> Option<String> {
        Some(imdb_id.to_string()).filter(|id| !id.is_empty())
    }

    /// Create a movie with reasonable defaults.
    pub fn new_movie(title: &str, imdb_id: &str) -> NewMovie {
        NewMovie {
            id: None,
            title: title.to_string(),
            imdb_id: imdb(imdb_id),
            rating: Some(7.8),
            rated: Some("R".to_string()),
            runtime: Some(120),
            language: "en".to_string(),
            release_date: NaiveDate::from_ymd_opt(1995, 12, 15).unwrap_or_default(),
            status: Some("Released".to_string()),
            genres: vec!["Crime".to_string(), "Drama".to_string()],
            summary: format!("{title} summary."),
            cast: vec!["Lead Actor".to_string(), "Supporting Actor".to_string()],
            homepage: Some(format!(
                "https://example.com/{}",
                title.to_lowercase().replace(' ', "-")
            )),
            banner_url: Some("https://image.example.com/banner.jpg".to_string()),
            poster_url: Some("https://image.example.com/poster.jpg".to_string()),
            trailer_url: Some("https://video.example.com/trailer".to_string()),
        }
    }

    /// Create a TV show with reasonable defaults.
    pub fn new_show(title: &str, imdb_id: &str) -> NewShow {
        NewShow {
            id: None,
            title: title.to_string(),
            imdb_id: imdb(imdb_id),
            rating: Some(8.5),
            rated: Some("TV-MA".to_string()),
            runtime: Some(55),
            language: "en".to_string(),
            first_air_date: NaiveDate::from_ymd_opt(2017, 12, 1).unwrap_or_default(),
            last_air_date: NaiveDate::from_ymd_opt(2020, 6, 27),
            status: Some("Ended".to_string()),
            genres: vec!["Drama".to_string(), "Mystery".to_string()],
            summary: format!("{title} summary."),
            cast: vec!["Lead Actor".to_string()],
            homepage: None,
            banner_url: Some("https://image.example.com/show-banner.jpg".to_string()),
            poster_url: Some("https://image.example.com/show-poster.jpg".to_string()),
        }
    }
}
