/// Storefront product state and webhook payload models
use crate::constants::{DESIGN_PRODUCT_TYPE, DESIGN_TAG, DESIGN_VENDOR};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// How many marking locations the customer configured, when stated.
///
/// `Unspecified` means the caller said nothing; reconciliation then keeps
/// whatever marking family the product already carries, normalized to the
/// one-marking family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkingDirective {
    #[default]
    Unspecified,
    One,
    Two,
}

impl MarkingDirective {
    /// Maps the wire value (`markingCount: 1 | 2`) to a directive.
    /// Anything else is treated as unspecified rather than rejected.
    pub fn from_count(count: Option<u8>) -> Self {
        match count {
            Some(1) => Self::One,
            Some(2) => Self::Two,
            _ => Self::Unspecified,
        }
    }
}

/// Mutable presentation state of a storefront product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductState {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Product payload as delivered by the storefront webhook.
///
/// Only the fields the attribution flow touches; the storefront sends tags
/// as one comma-separated string on this surface.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookProduct {
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
}

impl WebhookProduct {
    /// Product ids arrive as JSON numbers; normalize to a string key.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Detects the design tool's product family via type/vendor/tag markers
    pub fn is_design_product(&self) -> bool {
        self.product_type.as_deref() == Some(DESIGN_PRODUCT_TYPE)
            || self.vendor.as_deref() == Some(DESIGN_VENDOR)
            || self.tag_list().iter().any(|t| t == DESIGN_TAG)
    }

    /// Best-effort design-id extraction from the payload: a `data-design`
    /// attribute embedded in the description, or a "Design: X" title marker.
    pub fn design_id(&self) -> Option<String> {
        static BODY_PATTERN: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r#"data-design="([^"]+)""#).unwrap());
        static TITLE_PATTERN: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"Design:\s*([^\s,]+)").unwrap());

        if let Some(body) = &self.body_html
            && let Some(caps) = BODY_PATTERN.captures(body)
        {
            return Some(caps[1].to_string());
        }
        if let Some(title) = &self.title
            && let Some(caps) = TITLE_PATTERN.captures(title)
        {
            return Some(caps[1].to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marking_directive_from_count() {
        assert_eq!(MarkingDirective::from_count(Some(1)), MarkingDirective::One);
        assert_eq!(MarkingDirective::from_count(Some(2)), MarkingDirective::Two);
        assert_eq!(
            MarkingDirective::from_count(Some(7)),
            MarkingDirective::Unspecified
        );
        assert_eq!(
            MarkingDirective::from_count(None),
            MarkingDirective::Unspecified
        );
    }

    #[test]
    fn test_webhook_product_numeric_id() {
        let product: WebhookProduct =
            serde_json::from_str(r#"{"id": 8123456789, "title": "Tote"}"#).unwrap();
        assert_eq!(product.id_string(), "8123456789");
    }

    #[test]
    fn test_webhook_product_family_detection() {
        let by_type: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "product_type": "zakeke-design"}"#).unwrap();
        assert!(by_type.is_design_product());

        let by_vendor: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "vendor": "Zakeke"}"#).unwrap();
        assert!(by_vendor.is_design_product());

        let by_tag: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "tags": "custom, zakeke"}"#).unwrap();
        assert!(by_tag.is_design_product());

        let plain: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "vendor": "Acme", "tags": "summer"}"#).unwrap();
        assert!(!plain.is_design_product());
    }

    #[test]
    fn test_design_id_extraction() {
        let from_body: WebhookProduct = serde_json::from_str(
            r#"{"id": 1, "body_html": "<div data-design=\"D-42\"></div>"}"#,
        )
        .unwrap();
        assert_eq!(from_body.design_id(), Some("D-42".to_string()));

        let from_title: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "title": "Tote Design: D-7"}"#).unwrap();
        assert_eq!(from_title.design_id(), Some("D-7".to_string()));

        let none: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "title": "Tote"}"#).unwrap();
        assert_eq!(none.design_id(), None);
    }

    #[test]
    fn test_webhook_product_tag_list() {
        let product: WebhookProduct =
            serde_json::from_str(r#"{"id": 1, "tags": "a, b , ,c"}"#).unwrap();
        assert_eq!(product.tag_list(), vec!["a", "b", "c"]);
    }
}
