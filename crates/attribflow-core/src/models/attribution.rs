/// Attribution and session heartbeat records held in the ephemeral store
use super::product::MarkingDirective;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which endpoint produced an attribution record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionSource {
    LinkEndpoint,
    ActivityHeartbeat,
}

/// One observed binding between a Pro customer and a design/product context.
///
/// Created only for customer tags that pass the Pro-eligibility predicate;
/// indexed under up to three keys (design, product, session) at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub customer_id: String,
    pub customer_email: String,
    pub customer_tag: String,
    pub product_id: Option<String>,
    #[serde(default)]
    pub design_ids: Vec<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub marking: MarkingDirective,
    /// Marking tags carried over from a related source product, if any
    #[serde(default)]
    pub seed_marking_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Origin timestamp supplied by the caller (front-end clock), if any
    pub source_ts: Option<i64>,
    pub source: AttributionSource,
}

impl Attribution {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// "A Pro customer is currently active". One per customer id, refreshed on
/// each valid tracking call and evicted after the inactivity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heartbeat {
    pub customer_id: String,
    pub customer_email: String,
    pub pro_tag: String,
    pub company: String,
    pub last_seen: DateTime<Utc>,
    pub last_action: Option<String>,
    pub session_token: String,
}

impl Heartbeat {
    /// Converts the heartbeat into a lowest-confidence attribution record
    pub fn as_attribution(&self) -> Attribution {
        Attribution {
            customer_id: self.customer_id.clone(),
            customer_email: self.customer_email.clone(),
            customer_tag: self.pro_tag.clone(),
            product_id: None,
            design_ids: Vec::new(),
            session_id: None,
            marking: MarkingDirective::Unspecified,
            seed_marking_tags: Vec::new(),
            created_at: self.last_seen,
            source_ts: None,
            source: AttributionSource::ActivityHeartbeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_attribution() -> Attribution {
        Attribution {
            customer_id: "C1".to_string(),
            customer_email: "c1@example.com".to_string(),
            customer_tag: "proAcme".to_string(),
            product_id: None,
            design_ids: vec!["D1".to_string()],
            session_id: Some("S1".to_string()),
            marking: MarkingDirective::Unspecified,
            seed_marking_tags: Vec::new(),
            created_at: Utc::now(),
            source_ts: None,
            source: AttributionSource::LinkEndpoint,
        }
    }

    #[test]
    fn test_attribution_serializes_camel_case() {
        let json = serde_json::to_value(sample_attribution()).unwrap();
        assert_eq!(json["customerId"], "C1");
        assert_eq!(json["designIds"][0], "D1");
        assert_eq!(json["source"], "link-endpoint");
    }

    #[test]
    fn test_heartbeat_as_attribution() {
        let hb = Heartbeat {
            customer_id: "C1".to_string(),
            customer_email: "c1@example.com".to_string(),
            pro_tag: "proAcme".to_string(),
            company: "Acme".to_string(),
            last_seen: Utc::now(),
            last_action: Some("design-opened".to_string()),
            session_token: "tok".to_string(),
        };

        let attrib = hb.as_attribution();
        assert_eq!(attrib.customer_tag, "proAcme");
        assert_eq!(attrib.source, AttributionSource::ActivityHeartbeat);
        assert!(attrib.product_id.is_none());
    }
}
