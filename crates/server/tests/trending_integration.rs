//! Trending endpoint tests against a mock feed.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use common::TestFixture;
use flickvault_core::{ExternalCatalogError, MediaType, TrendingFeedEntry};

async fn seed(fixture: &TestFixture) -> (String, String) {
    let movie_id = fixture.add_movie("Heat", "tt0113277");
    let show_id = fixture.add_show("Dark", "tt5753856");

    fixture
        .feed
        .set_entries(vec![
            TrendingFeedEntry::new("tv", 70523),
            TrendingFeedEntry::new("person", 287),
            TrendingFeedEntry::new("movie", 949),
        ])
        .await;
    fixture
        .feed
        .set_imdb_id(MediaType::Movie, 949, "tt0113277")
        .await;
    fixture
        .feed
        .set_imdb_id(MediaType::Tv, 70523, "tt5753856")
        .await;

    (movie_id, show_id)
}

#[tokio::test]
async fn test_trending_in_feed_order() {
    let fixture = TestFixture::new();
    let (movie_id, show_id) = seed(&fixture).await;

    let response = fixture.get("/api/v1/trending").await;
    assert_status!(response, StatusCode::OK);

    let items = response.body["trendingItems"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0]["id"], show_id.as_str());
    assert_eq!(items[0]["type"], "tv");
    assert_eq!(items[0]["title"], "Dark");
    assert_eq!(items[0]["firstAirDate"], "2017-12-01");
    assert_eq!(items[0]["lastAirDate"], "2020-06-27");
    assert_eq!(items[0]["rated"], "TV-MA");

    assert_eq!(items[1]["id"], movie_id.as_str());
    assert_eq!(items[1]["type"], "movie");
    assert_eq!(items[1]["releaseDate"], "1995-12-15");
    assert_eq!(items[1]["bannerUrl"], "https://image.example.com/banner.jpg");

    // Internal bookkeeping is not exposed
    assert!(items[0].get("createdAt").is_none());
    assert!(items[0].get("rank").is_none());
}

#[tokio::test]
async fn test_trending_is_cached_between_requests() {
    let fixture = TestFixture::new();
    seed(&fixture).await;

    for _ in 0..3 {
        let response = fixture.get("/api/v1/trending").await;
        assert_status!(response, StatusCode::OK);
    }

    assert_eq!(fixture.feed.trending_fetch_count().await, 1);
}

#[tokio::test]
async fn test_trending_without_catalog_matches_is_empty() {
    let fixture = TestFixture::new();
    fixture
        .feed
        .set_entries(vec![TrendingFeedEntry::new("movie", 101)])
        .await;
    fixture
        .feed
        .set_imdb_id(MediaType::Movie, 101, "tt001")
        .await;

    let response = fixture.get("/api/v1/trending").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["trendingItems"], serde_json::json!([]));
}

#[tokio::test]
async fn test_trending_feed_down_with_empty_cache() {
    let fixture = TestFixture::new();
    fixture
        .feed
        .set_next_error(ExternalCatalogError::HttpError("connection refused".to_string()))
        .await;

    let response = fixture.get("/api/v1/trending").await;
    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
    // The upstream cause stays in the logs
    assert!(!response.text.contains("connection refused"));
}

#[tokio::test]
async fn test_trending_feed_down_serves_stale_items() {
    let fixture = TestFixture::new();
    let (_, show_id) = seed(&fixture).await;

    fixture.get("/api/v1/trending").await;
    fixture.set_trending_created_at(Utc::now() - chrono::Duration::days(8));

    fixture
        .feed
        .set_next_error(ExternalCatalogError::RateLimitExceeded)
        .await;

    let response = fixture.get("/api/v1/trending").await;
    assert_status!(response, StatusCode::OK);
    let items = response.body["trendingItems"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], show_id.as_str());
    assert_eq!(fixture.feed.trending_fetch_count().await, 2);
}

#[tokio::test]
async fn test_trending_refreshes_after_freshness_window() {
    let fixture = TestFixture::new();
    let (movie_id, _) = seed(&fixture).await;

    fixture.get("/api/v1/trending").await;

    // Just inside the window: still served from cache
    fixture.set_trending_created_at(Utc::now() - chrono::Duration::hours(6 * 24 + 23));
    fixture.get("/api/v1/trending").await;
    assert_eq!(fixture.feed.trending_fetch_count().await, 1);

    // Past the window with a new feed
    fixture.set_trending_created_at(
        Utc::now() - chrono::Duration::days(7) - chrono::Duration::seconds(1),
    );
    fixture
        .feed
        .set_entries(vec![TrendingFeedEntry::new("movie", 949)])
        .await;

    let response = fixture.get("/api/v1/trending").await;
    assert_status!(response, StatusCode::OK);
    let items = response.body["trendingItems"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], movie_id.as_str());
    assert_eq!(fixture.feed.trending_fetch_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_stale_requests_fetch_once() {
    let fixture = TestFixture::new();
    seed(&fixture).await;
    fixture.feed.set_delay(Duration::from_millis(100)).await;

    let (a, b, c) = tokio::join!(
        fixture.get("/api/v1/trending"),
        fixture.get("/api/v1/trending"),
        fixture.get("/api/v1/trending"),
    );

    for response in [a, b, c] {
        assert_status!(response, StatusCode::OK);
        assert_eq!(response.body["trendingItems"].as_array().unwrap().len(), 2);
    }
    assert_eq!(fixture.feed.trending_fetch_count().await, 1);
}

#[tokio::test]
async fn test_metrics_report_trending_cache_size() {
    let fixture = TestFixture::new();
    seed(&fixture).await;
    fixture.get("/api/v1/trending").await;

    let response = fixture.get("/api/v1/metrics").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("flickvault_trending_items_cached"));
    assert!(response.text.contains("flickvault_trending_refreshes_total"));
}
