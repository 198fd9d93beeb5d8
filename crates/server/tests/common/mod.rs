//! Common test utilities for API testing.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a temporary SQLite database and a seeded offer generator,
//! so every run synthesizes the same offers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use travelpair_core::{
    seed_providers, Config, DatabaseConfig, NewProvider, ProviderStore, SearchConfig,
    SearchService, SearchStore, ServerConfig, SqliteProviderStore, SqliteSearchStore,
};

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use travelpair_core::testing::fixtures;

/// Seed used by fixtures unless a test picks its own.
pub const TEST_SEED: u64 = 7;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/searches", json!({
///         "mode": "flight",
///         "origin": "Mumbai",
///         "destination": "Delhi",
///         "departure_date": "2030-01-15"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Provider store shared with the router
    pub providers: Arc<dyn ProviderStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a test fixture with the fixture provider roster.
    pub async fn new() -> Self {
        Self::with_providers(fixtures::providers()).await
    }

    /// Create a test fixture with a custom provider roster.
    pub async fn with_providers(roster: Vec<NewProvider>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            search: SearchConfig {
                result_delay_ms: 0,
                seed: Some(TEST_SEED),
                ..Default::default()
            },
            providers: roster,
        };

        let providers: Arc<dyn ProviderStore> = Arc::new(
            SqliteProviderStore::new(&db_path).expect("Failed to create provider store"),
        );
        seed_providers(providers.as_ref(), &config.providers).expect("Failed to seed providers");

        let searches: Arc<dyn SearchStore> = Arc::new(
            SqliteSearchStore::new(&db_path).expect("Failed to create search store"),
        );

        let service = Arc::new(SearchService::new(
            Arc::clone(&providers),
            searches,
            config.search.synthesis.clone(),
            config.search.seed,
        ));

        let state = Arc::new(travelpair_server::state::AppState::new(
            config,
            Arc::clone(&providers),
            service,
        ));

        let router = travelpair_server::api::create_router(state);

        Self {
            router,
            providers,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch the raw text of a response (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let request_builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json) => request_builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => request_builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
