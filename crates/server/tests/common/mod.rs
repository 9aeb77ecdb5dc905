//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a
//! dispatcher over real slot-gated proxies, without binding a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use rotaproxy_core::{build_pool, Config, Dispatcher, Proxy, SpinPolicy};
use rotaproxy_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use rotaproxy_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_dispatch() {
///     let fixture = TestFixture::new(fixtures::config_with_proxies(2));
///
///     let response = fixture.post("/api/v1/dispatch").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Dispatcher behind the router, for inspecting proxy capacity
    pub dispatcher: Arc<Dispatcher<Proxy>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture from `config`. No replenisher runs, so capacity
    /// only goes down.
    pub fn new(config: Config) -> Self {
        let pool = build_pool(&config.proxies).expect("Failed to build pool");
        let dispatcher = Arc::new(
            Dispatcher::new(pool)
                .expect("Failed to create dispatcher")
                .with_policy(SpinPolicy::from(&config.dispatcher)),
        );
        let state = Arc::new(AppState::new(config, Arc::clone(&dispatcher)));

        Self {
            router: create_router(state),
            dispatcher,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.request("POST", uri).await
    }

    async fn request(&self, method: &str, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}
