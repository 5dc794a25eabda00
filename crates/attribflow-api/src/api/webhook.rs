/// Storefront webhook endpoint: asynchronous product created/updated events
use crate::context::ApiContext;
use crate::error::ApiError;
use attribflow_core::constants::{
    TOPIC_PRODUCT_CREATE, TOPIC_PRODUCT_UPDATE, WEBHOOK_DEBOUNCE, WEBHOOK_HMAC_HEADER,
    WEBHOOK_TOPIC_HEADER,
};
use attribflow_core::models::WebhookProduct;
use attribflow_core::reconcile::ReconcileTarget;
use attribflow_core::services::signature::verify_webhook_signature;
use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

fn skipped(reason: &str) -> Json<Value> {
    Json(json!({ "ok": true, "skipped": true, "reason": reason }))
}

/// POST /webhook/product
///
/// The raw body is verified before any JSON decoding; everything after the
/// signature gate is a normal 200 outcome, including "nothing matched".
pub async fn product(
    State(ctx): State<Arc<ApiContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(WEBHOOK_HMAC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_webhook_signature(&ctx.config.webhook_secret, &body, signature) {
        // One opaque message regardless of which part mismatched
        warn!("Webhook signature verification failed");
        return Err(ApiError::Unauthorized("invalid signature".to_string()));
    }

    let topic = headers
        .get(WEBHOOK_TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if topic != TOPIC_PRODUCT_CREATE && topic != TOPIC_PRODUCT_UPDATE {
        return Ok(Json(json!({
            "ok": true, "skipped": true, "reason": "irrelevant-topic", "topic": topic,
        })));
    }

    let product: WebhookProduct = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    if !product.is_design_product() {
        return Ok(skipped("not-design-product"));
    }

    let product_id = product.id_string();

    // Bursts of near-duplicate deliveries collapse into one pass
    let debounce_key = format!("webhook:{}", product_id);
    if ctx.store.check_cooldown(&debounce_key, WEBHOOK_DEBOUNCE).await? {
        info!(product_id = %product_id, "Webhook debounced");
        return Ok(skipped("debounced"));
    }
    ctx.store.sweep().await?;

    let design_id = product.design_id();
    info!(
        product_id = %product_id,
        design_id = design_id.as_deref().unwrap_or("-"),
        topic = topic,
        "Processing product webhook"
    );

    match ctx
        .resolver
        .resolve(Some(&product_id), design_id.as_deref())
        .await?
    {
        Some(resolution) => {
            let target = ReconcileTarget::from_attribution(&resolution.attribution);
            let outcome = ctx.reconciler.reconcile(&product_id, &target).await;
            Ok(Json(json!({
                "ok": true,
                "processed": true,
                "productId": product_id,
                "source": resolution.source,
                "customerTag": resolution.attribution.customer_tag,
                "reconcile": outcome,
            })))
        }
        None => {
            // Expected steady-state miss; flag the product for later manual
            // reconciliation instead of fabricating an attribution.
            let marker = ctx.reconciler.mark_pending(&product_id).await;
            Ok(Json(json!({
                "ok": true,
                "processed": false,
                "reason": "no-attribution",
                "productId": product_id,
                "pendingMarker": marker,
            })))
        }
    }
}
