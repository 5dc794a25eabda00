//! Common test utilities for endpoint integration tests
#![allow(dead_code)]

use attribflow_api::{ApiContext, router};
use attribflow_core::models::AppConfig;
use attribflow_core::services::shopify::{MockProductApi, ProductApi};
use attribflow_core::services::signature::sign_body;
use attribflow_core::store::{AttributionStore, MemoryStore};
use attribflow_core::utils::retry::RetryPolicy;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123";
pub const TEST_ORIGIN: &str = "https://www.lefagoteur.com";

pub fn test_config() -> AppConfig {
    AppConfig::new(
        "test-shop.myshopify.com".to_string(),
        "shpat_test_token".to_string(),
        TEST_WEBHOOK_SECRET.to_string(),
        "2024-01".to_string(),
        r"^https://([a-z0-9-]+\.)*lefagoteur\.com$",
    )
    .expect("test config is valid")
}

/// An application wired with in-memory collaborators and millisecond retry
/// delays, so the full flows run fast under test.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub products: Arc<MockProductApi>,
}

pub fn test_app() -> TestApp {
    test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn test_app_with_store(store: Arc<MemoryStore>) -> TestApp {
    let products = Arc::new(MockProductApi::new());
    let ctx = ApiContext::with_policies(
        test_config(),
        Arc::clone(&store) as Arc<dyn AttributionStore>,
        Arc::clone(&products) as Arc<dyn ProductApi>,
        RetryPolicy::new(2, 10),
        RetryPolicy::new(2, 10),
        false,
    );

    TestApp {
        router: router(ctx),
        store,
        products,
    }
}

pub async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, TEST_ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn get_json(router: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::ORIGIN, TEST_ORIGIN)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

/// Delivers a webhook with the given raw body, topic, and signature header
pub async fn post_webhook(
    router: &Router,
    raw_body: &str,
    topic: &str,
    signature: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/product")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-shopify-topic", topic)
        .header("x-shopify-hmac-sha256", signature)
        .body(Body::from(raw_body.to_string()))
        .unwrap();
    send(router, request).await
}

/// Signs a body the way the storefront does
pub fn sign(raw_body: &str) -> String {
    sign_body(TEST_WEBHOOK_SECRET, raw_body.as_bytes())
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router never fails");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
