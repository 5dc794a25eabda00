/// Attribflow API - HTTP Lambda
///
/// This module contains the HTTP endpoints tying the attribution flow
/// together: the front-end link/track endpoints and the storefront webhook.
pub mod api;
pub mod context;
pub mod error;
pub mod middleware;

pub use context::ApiContext;
pub use error::ApiError;

use axum::{
    Router,
    body::Body as AxumBody,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

/// Builds the application router
pub fn router(ctx: Arc<ApiContext>) -> Router {
    // Credentialed CORS restricted to the storefront's own origins
    let allowed_origin = ctx.config.allowed_origin.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| allowed_origin.is_match(o))
                .unwrap_or(false)
        }))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
        ]);

    Router::new()
        .route("/link", post(api::link::link).get(api::link::lookup))
        .route("/track", post(api::track::track))
        .route("/webhook/product", post(api::webhook::product))
        .route("/health", get(api::health::handler))
        .route_layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(cors)
        .with_state(ctx)
}

/// Main API handler - converts a Lambda HTTP request into an Axum response
pub async fn handler(ctx: Arc<ApiContext>, event: Request) -> Result<Response<Body>, LambdaError> {
    let app = router(ctx);

    let (parts, body) = event.into_parts();
    let body_bytes = body.to_vec();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body_bytes));

    match app.oneshot(axum_request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            let body_bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();
            Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
        }
        Err(err) => {
            error!("Axum router error: {}", err);
            let response = Response::builder()
                .status(500)
                .body(Body::from(
                    serde_json::json!({
                        "error": "Internal server error"
                    })
                    .to_string(),
                ))
                .expect("static 500 response");
            Ok(response)
        }
    }
}
