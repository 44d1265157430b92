//! Common test utilities for in-process API testing with mocks.
//!
//! The fixture builds the real router over SQLite stores in a temp
//! directory, with the trending feed replaced by [`MockTrendingFeed`].

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use flickvault_core::{
    load_config_from_str, testing::MockTrendingFeed, AccountService, CatalogStore,
    JwtAuthenticator, SqliteCatalog, SqliteTrendingStore, SqliteUserStore, TokenManager,
    TrendingCache, TrendingSettings, TrendingStore,
};
use flickvault_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use flickvault_core::testing::fixtures;

pub const TEST_PASSWORD: &str = "SecurePass123!";

/// Test fixture for API testing with a mock trending feed.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock trending feed - configure entries and failures
    pub feed: Arc<MockTrendingFeed>,
    pub catalog: Arc<SqliteCatalog>,
    pub trending_store: Arc<SqliteTrendingStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = load_config_from_str(&format!(
            r#"
[auth]
token_secret = "test-secret"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "{}"

[cors]
allowed_origins = ["http://localhost:5173"]
"#,
            db_path.display()
        ))
        .expect("Failed to parse test config");

        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));
        let users = Arc::new(SqliteUserStore::new(&db_path).expect("Failed to create user store"));
        let trending_store = Arc::new(
            SqliteTrendingStore::new(&db_path).expect("Failed to create trending store"),
        );
        let feed = Arc::new(MockTrendingFeed::new());

        let tokens = Arc::new(TokenManager::from_config(&config.auth).unwrap());
        let trending = Arc::new(TrendingCache::new(
            feed.clone(),
            catalog.clone(),
            trending_store.clone(),
            TrendingSettings::from(&config.trending),
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::new(JwtAuthenticator::new(tokens.clone(), users.clone())),
            catalog.clone(),
            users.clone(),
            Arc::new(AccountService::new(users, tokens)),
            trending,
            trending_store.clone(),
        ));

        Self {
            router: create_router(state),
            feed,
            catalog,
            trending_store,
            temp_dir,
        }
    }

    /// Backdate every cached trending item to `created_at`.
    pub fn set_trending_created_at(&self, created_at: DateTime<Utc>) {
        let items: Vec<_> = self
            .trending_store
            .list()
            .unwrap()
            .into_iter()
            .map(|mut item| {
                item.created_at = created_at;
                item
            })
            .collect();
        self.trending_store.replace_all(&items).unwrap();
    }

    /// Insert a movie and return its id.
    pub fn add_movie(&self, title: &str, imdb_id: &str) -> String {
        self.catalog
            .upsert_movie(fixtures::new_movie(title, imdb_id))
            .unwrap()
            .id
    }

    /// Insert a show and return its id.
    pub fn add_show(&self, title: &str, imdb_id: &str) -> String {
        self.catalog
            .upsert_show(fixtures::new_show(title, imdb_id))
            .unwrap()
            .id
    }

    /// Drop the catalog table out from under the store so lookups fail.
    pub fn break_catalog(&self) {
        let conn = rusqlite::Connection::open(self.temp_dir.path().join("test.db")).unwrap();
        conn.execute("DROP TABLE media", []).unwrap();
    }

    /// Register an account and return a fresh access token for it.
    pub async fn login_as(&self, email: &str) -> String {
        let response = self
            .post(
                "/api/v1/user/register",
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        let response = self
            .post(
                "/api/v1/user/login",
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["accessToken"]
            .as_str()
            .expect("accessToken missing")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a GET request with a bearer token.
    pub async fn get_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request("GET", path, None, Some(token)).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request with a bearer token and no body.
    pub async fn post_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request("POST", path, None, Some(token)).await
    }

    /// Send a DELETE request with a bearer token.
    pub async fn delete_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(token)).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder =
                request_builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
