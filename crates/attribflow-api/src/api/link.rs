/// Inbound Link endpoint: "this design/product/session belongs to this customer"
use crate::context::ApiContext;
use crate::error::ApiError;
use attribflow_core::constants::ATTRIBUTION_TTL;
use attribflow_core::eligibility::is_pro_tag;
use attribflow_core::models::{Attribution, AttributionSource, MarkingDirective};
use attribflow_core::reconcile::{ReconcileOutcome, ReconcileTarget};
use attribflow_core::utils::logging::email_domain;
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    #[serde(default)]
    pub design_id: Option<String>,
    #[serde(default, deserialize_with = "super::de_opt_id")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "super::de_opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_tag: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// 1 or 2 marking locations; anything else reads as unspecified
    #[serde(default)]
    pub marking_count: Option<u8>,
    /// Marking tags carried over from a related source product
    #[serde(default)]
    pub marking_tags: Vec<String>,
    /// Front-end clock at the moment of the link, for audit
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub success: bool,
    pub design_id: Option<String>,
    pub product_id: Option<String>,
    pub session_id: Option<String>,
    pub customer_id: String,
    pub customer_tag: String,
    pub ttl_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileOutcome>,
}

/// POST /link
pub async fn link(
    State(ctx): State<Arc<ApiContext>>,
    Json(req): Json<LinkRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.design_id.is_none() && req.product_id.is_none() {
        return Err(ApiError::BadRequest(
            "Missing designId or productId".to_string(),
        ));
    }
    let (Some(customer_id), Some(customer_email)) = (req.customer_id, req.customer_email) else {
        return Err(ApiError::BadRequest(
            "Missing customerId or customerEmail".to_string(),
        ));
    };

    let customer_tag = req.customer_tag.unwrap_or_default().trim().to_string();
    if !is_pro_tag(&customer_tag) {
        // Routine non-match, kept quiet: a negative outcome, not an error
        return Ok(Json(json!({ "success": false, "reason": "not-pro" })));
    }

    let record = Attribution {
        customer_id: customer_id.clone(),
        customer_email,
        customer_tag: customer_tag.clone(),
        product_id: req.product_id.clone(),
        design_ids: req.design_id.clone().into_iter().collect(),
        session_id: req.session_id.clone(),
        marking: MarkingDirective::from_count(req.marking_count),
        seed_marking_tags: req.marking_tags.clone(),
        created_at: Utc::now(),
        source_ts: req.timestamp,
        source: AttributionSource::LinkEndpoint,
    };

    let target = ReconcileTarget::from_attribution(&record);
    let email_log = email_domain(&record.customer_email);
    ctx.store.put_link(record).await?;
    ctx.store.sweep().await?;

    info!(
        design_id = req.design_id.as_deref().unwrap_or("-"),
        product_id = req.product_id.as_deref().unwrap_or("-"),
        session_id = req.session_id.as_deref().unwrap_or("-"),
        customer_id = %customer_id,
        email_domain = %email_log,
        tag = %customer_tag,
        "Linked design to customer"
    );

    // A product id means the product already exists: reconcile immediately
    // and report the outcome inline.
    let reconcile = match &req.product_id {
        Some(product_id) => Some(ctx.reconciler.reconcile(product_id, &target).await),
        None => None,
    };

    let response = LinkResponse {
        success: true,
        design_id: req.design_id,
        product_id: req.product_id,
        session_id: req.session_id,
        customer_id,
        customer_tag,
        ttl_ms: ATTRIBUTION_TTL.as_millis() as u64,
        reconcile,
    };
    Ok(Json(serde_json::to_value(response)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
    pub design_id: Option<String>,
    pub product_id: Option<String>,
    pub session_id: Option<String>,
}

/// GET /link - debug lookup over the store's three indexes
pub async fn lookup(
    State(ctx): State<Arc<ApiContext>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Value>, ApiError> {
    let by_design = match &query.design_id {
        Some(design_id) => ctx.store.get_by_design(design_id).await?,
        None => None,
    };
    let by_product = match &query.product_id {
        Some(product_id) => ctx.store.get_by_product(product_id).await?,
        None => None,
    };
    let by_session = match &query.session_id {
        Some(session_id) => ctx.store.get_by_session(session_id).await?,
        None => None,
    };

    Ok(Json(json!({
        "designId": query.design_id,
        "productId": query.product_id,
        "sessionId": query.session_id,
        "byDesignExists": by_design.is_some(),
        "byProductExists": by_product.is_some(),
        "bySessionExists": by_session.is_some(),
        "byDesign": by_design,
        "byProduct": by_product,
        "bySession": by_session,
        "ttlMs": ATTRIBUTION_TTL.as_millis() as u64,
    })))
}
