/// Activity tracking endpoint: lightweight session heartbeats
use crate::context::ApiContext;
use crate::error::ApiError;
use attribflow_core::constants::{ACTION_COOLDOWN, HEARTBEAT_TTL};
use attribflow_core::eligibility::{first_pro_tag, split_tags};
use attribflow_core::models::Heartbeat;
use attribflow_core::reconcile::company_label;
use attribflow_core::utils::logging::email_domain;
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Tags arrive either as a delimited string or as a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Raw(String),
}

impl TagsField {
    fn candidates(&self) -> Vec<String> {
        match self {
            Self::List(tags) => tags
                .iter()
                .flat_map(|t| split_tags(t))
                .collect(),
            Self::Raw(raw) => split_tags(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[serde(default, deserialize_with = "super::de_opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default, alias = "customerTag")]
    pub customer_tags: Option<TagsField>,
    #[serde(default)]
    pub action: Option<String>,
}

/// POST /track
pub async fn track(
    State(ctx): State<Arc<ApiContext>>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(customer_id), Some(customer_email)) = (req.customer_id, req.customer_email) else {
        return Err(ApiError::BadRequest(
            "Missing customerId or customerEmail".to_string(),
        ));
    };

    let candidates = req
        .customer_tags
        .map(|tags| tags.candidates())
        .unwrap_or_default();
    let Some(pro_tag) = first_pro_tag(candidates.iter().map(String::as_str)) else {
        return Ok(Json(json!({ "success": false, "reason": "not-pro" })));
    };

    let action = req.action.unwrap_or_else(|| "activity".to_string());

    // Rapid-fire duplicates within the cooldown window are accepted but
    // produce no state change.
    let cooldown_key = format!("track:{}:{}", customer_id, action);
    if ctx.store.check_cooldown(&cooldown_key, ACTION_COOLDOWN).await? {
        debug!(customer_id = %customer_id, action = %action, "Heartbeat within cooldown");
        return Ok(Json(json!({ "success": true, "skipped": true, "reason": "cooldown" })));
    }

    let company = company_label(&pro_tag);
    let heartbeat = Heartbeat {
        customer_id: customer_id.clone(),
        customer_email: customer_email.clone(),
        pro_tag: pro_tag.clone(),
        company: company.clone(),
        last_seen: Utc::now(),
        last_action: Some(action.clone()),
        session_token: Uuid::new_v4().to_string(),
    };
    let session_token = heartbeat.session_token.clone();

    ctx.store.upsert_heartbeat(heartbeat).await?;
    ctx.store.sweep().await?;

    info!(
        customer_id = %customer_id,
        email_domain = %email_domain(&customer_email),
        tag = %pro_tag,
        action = %action,
        "Heartbeat refreshed"
    );

    Ok(Json(json!({
        "success": true,
        "proTag": pro_tag,
        "company": company,
        "sessionToken": session_token,
        "expiresInMs": HEARTBEAT_TTL.as_millis() as u64,
    })))
}
