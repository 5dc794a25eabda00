//! GraphQL client tests against a mocked storefront Admin API
use attribflow_core::error::AttribflowError;
use attribflow_core::services::shopify::{ProductApi, ShopifyClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ShopifyClient {
    ShopifyClient::with_endpoint(
        format!("{}/admin/api/2024-01/graphql.json", server.uri()),
        "shpat_test_token".to_string(),
    )
}

#[tokio::test]
async fn test_get_product_reads_title_and_tags() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/graphql.json"))
        .and(header("X-Shopify-Access-Token", "shpat_test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "product": {
                    "id": "gid://shopify/Product/42",
                    "title": "Acme - Tote bag",
                    "tags": ["proAcme", "X-1M"],
                    "updatedAt": "2026-08-01T10:00:00Z"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = client_for(&server).get_product("42").await.unwrap();
    assert_eq!(state.title, "Acme - Tote bag");
    assert_eq!(state.tags, vec!["proAcme", "X-1M"]);
    assert!(state.updated_at.is_some());
}

#[tokio::test]
async fn test_get_product_null_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "product": null }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_product("42").await.unwrap_err();
    assert!(matches!(err, AttribflowError::ProductNotFound(_)));
    // retriable: a fresh product may simply not be queryable yet
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_update_product_user_errors_are_distinct() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "productUpdate": {
                    "product": null,
                    "userErrors": [
                        { "field": ["title"], "message": "is too long" }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .update_product("42", &["proAcme".to_string()], "A title")
        .await
        .unwrap_err();

    match err {
        AttribflowError::UserErrors(detail) => {
            assert!(detail.contains("title"));
            assert!(detail.contains("is too long"));
        }
        other => panic!("expected user errors, got {:?}", other),
    }
    // field-level rejections are permanent, not retried
    assert!(!AttribflowError::UserErrors(String::new()).is_retriable());
}

#[tokio::test]
async fn test_transport_failure_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server).get_product("42").await.unwrap_err();
    assert!(matches!(err, AttribflowError::Upstream(_)));
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_graphql_level_errors_are_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [ { "message": "Throttled" } ]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_product("42").await.unwrap_err();
    match err {
        AttribflowError::Upstream(msg) => assert!(msg.contains("Throttled")),
        other => panic!("expected upstream error, got {:?}", other),
    }
}
