/// API endpoint modules
pub mod health;
pub mod link;
pub mod track;
pub mod webhook;

use serde::{Deserialize, Deserializer};

/// Storefront payloads carry ids as either strings or bare numbers;
/// normalize both shapes to `Option<String>` at the wire boundary.
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Number(i64),
    }

    let value: Option<IdValue> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        IdValue::Text(s) => s,
        IdValue::Number(n) => n.to_string(),
    }))
}
