/// Health check endpoint
use crate::context::ApiContext;
use crate::error::ApiError;
use attribflow_core::store::StoreCounts;
use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub store: StoreCounts,
}

/// GET /health
pub async fn handler(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let store = ctx.store.counts().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: attribflow_core::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store,
    }))
}
