//! Account and watchlist endpoint tests.

mod common;

use axum::http::StatusCode;
use common::{TestFixture, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_register() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/user/register",
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["email"], "alice@example.com");
    assert!(!response.text.contains(TEST_PASSWORD));
}

#[tokio::test]
async fn test_register_duplicate_ignores_case() {
    let fixture = TestFixture::new();
    fixture.login_as("alice@example.com").await;

    let response = fixture
        .post(
            "/api/v1/user/register",
            json!({ "email": "ALICE@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_status!(response, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_register_validation() {
    let fixture = TestFixture::new();

    let response = fixture
        .post(
            "/api/v1/user/register",
            json!({ "email": "not-an-email", "password": TEST_PASSWORD }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Not a valid email");

    for password in ["short1!", "alllowercase1!", "NoDigitsHere!", "NoSpecial123"] {
        let response = fixture
            .post(
                "/api/v1/user/register",
                json!({ "email": "bob@example.com", "password": password }),
            )
            .await;
        assert_status!(response, StatusCode::BAD_REQUEST);
        assert!(response.body["message"].is_string());
    }
}

#[tokio::test]
async fn test_login_failures() {
    let fixture = TestFixture::new();
    fixture.login_as("alice@example.com").await;

    let response = fixture
        .post(
            "/api/v1/user/login",
            json!({ "email": "alice@example.com", "password": "WrongPass123!" }),
        )
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    let response = fixture
        .post(
            "/api/v1/user/login",
            json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_details_requires_token() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;

    let response = fixture.get_auth("/api/v1/user/details", &token).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["userDetails"]["email"], "alice@example.com");

    let response = fixture.get("/api/v1/user/details").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    let response = fixture
        .get_auth("/api/v1/user/details", "not-a-token")
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;

    let response = fixture.get_auth("/api/v1/user/logout", &token).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let response = fixture.get_auth("/api/v1/user/details", &token).await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    // A new login still works
    let response = fixture
        .post(
            "/api/v1/user/login",
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    let fresh = response.body["accessToken"].as_str().unwrap();
    let response = fixture.get_auth("/api/v1/user/details", fresh).await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_without_token() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/user/logout").await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture.get_auth("/api/v1/user/logout", "garbage").await;
    assert_status!(response, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_watchlist_lifecycle() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;
    let show_id = fixture.add_show("Dark", "tt5753856");
    let movie_id = fixture.add_movie("Heat", "tt0113277");

    let response = fixture.get_auth("/api/v1/user/watchlist", &token).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["watchlist"], json!([]));

    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{show_id}"), &token)
        .await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(
        response.body["message"],
        "TV show added to watchlist successfully"
    );

    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &token)
        .await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(
        response.body["message"],
        "Movie added to watchlist successfully"
    );

    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &token)
        .await;
    assert_status!(response, StatusCode::CONFLICT);
    assert_eq!(
        response.body["message"],
        "Movie already exists in watchlist"
    );

    // Insertion order
    let response = fixture.get_auth("/api/v1/user/watchlist", &token).await;
    assert_status!(response, StatusCode::OK);
    let watchlist = response.body["watchlist"].as_array().unwrap();
    assert_eq!(watchlist.len(), 2);
    assert_eq!(watchlist[0]["id"], show_id.as_str());
    assert_eq!(watchlist[0]["type"], "tv");
    assert_eq!(watchlist[1]["id"], movie_id.as_str());

    let response = fixture
        .delete_auth(&format!("/api/v1/user/watchlist/{show_id}"), &token)
        .await;
    assert_status!(response, StatusCode::OK);

    // Removing again still succeeds
    let response = fixture
        .delete_auth(&format!("/api/v1/user/watchlist/{show_id}"), &token)
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.get_auth("/api/v1/user/watchlist", &token).await;
    let watchlist = response.body["watchlist"].as_array().unwrap();
    assert_eq!(watchlist.len(), 1);
    assert_eq!(watchlist[0]["id"], movie_id.as_str());
}

#[tokio::test]
async fn test_watchlist_unknown_item() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;

    let response = fixture
        .post_auth("/api/v1/user/watchlist/does-not-exist", &token)
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_watchlists_are_per_user() {
    let fixture = TestFixture::new();
    let alice = fixture.login_as("alice@example.com").await;
    let bob = fixture.login_as("bob@example.com").await;
    let movie_id = fixture.add_movie("Heat", "tt0113277");

    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &alice)
        .await;
    assert_status!(response, StatusCode::CREATED);

    let response = fixture.get_auth("/api/v1/user/watchlist", &bob).await;
    assert_eq!(response.body["watchlist"], json!([]));
}

#[tokio::test]
async fn test_watchlist_requires_token() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/user/watchlist").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_watchlist_remove_unknown_item() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;

    let response = fixture
        .delete_auth("/api/v1/user/watchlist/does-not-exist", &token)
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "Item removed from watchlist successfully"
    );
}

#[tokio::test]
async fn test_watchlist_remove_survives_catalog_failure() {
    let fixture = TestFixture::new();
    let token = fixture.login_as("alice@example.com").await;
    let movie_id = fixture.add_movie("Heat", "tt0113277");

    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &token)
        .await;
    assert_status!(response, StatusCode::CREATED);

    fixture.break_catalog();

    // The item is still removed, only the label falls back
    let response = fixture
        .delete_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &token)
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "Item removed from watchlist successfully"
    );

    // Adding now fails cleanly instead of guessing
    let response = fixture
        .post_auth(&format!("/api/v1/user/watchlist/{movie_id}"), &token)
        .await;
    assert_status!(response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
}
