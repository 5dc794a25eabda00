/// Storefront Admin GraphQL API boundary
///
/// The core touches exactly two operations: read a product's title/tags and
/// write a replacement tag list + title. Field-level userErrors are reported
/// distinctly from transport errors so the reconciler can decide what is
/// retriable.
use crate::constants::PRODUCT_GID_PREFIX;
use crate::error::AttribflowError;
use crate::models::{AppConfig, ProductState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

const PRODUCT_QUERY: &str = r#"
query ProductState($id: ID!) {
  product(id: $id) {
    id
    title
    tags
    updatedAt
  }
}
"#;

const PRODUCT_UPDATE_MUTATION: &str = r#"
mutation ProductReconcile($input: ProductInput!) {
  productUpdate(input: $input) {
    product {
      id
    }
    userErrors {
      field
      message
    }
  }
}
"#;

#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn get_product(&self, product_id: &str) -> Result<ProductState, AttribflowError>;

    async fn update_product(
        &self,
        product_id: &str,
        tags: &[String],
        title: &str,
    ) -> Result<(), AttribflowError>;
}

/// GraphQL client against the storefront Admin API
pub struct ShopifyClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "https://{}/admin/api/{}/graphql.json",
                config.shop_domain, config.api_version
            ),
            access_token: config.access_token.clone(),
        }
    }

    /// Test constructor pointing at an arbitrary endpoint
    pub fn with_endpoint(endpoint: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            access_token,
        }
    }

    /// Numeric ids from webhooks become global ids; already-global ids pass through
    pub fn product_gid(product_id: &str) -> String {
        if product_id.starts_with(PRODUCT_GID_PREFIX) {
            product_id.to_string()
        } else {
            format!("{}{}", PRODUCT_GID_PREFIX, product_id)
        }
    }

    async fn post_graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, AttribflowError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttribflowError::Upstream(format!(
                "GraphQL endpoint returned {}",
                status
            )));
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AttribflowError::Upstream(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| AttribflowError::Upstream("GraphQL response without data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: String,
    title: String,
    tags: Vec<String>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserError {
    field: Option<Vec<String>>,
    message: String,
}

#[async_trait]
impl ProductApi for ShopifyClient {
    async fn get_product(&self, product_id: &str) -> Result<ProductState, AttribflowError> {
        let gid = Self::product_gid(product_id);
        let data = self
            .post_graphql(PRODUCT_QUERY, json!({ "id": gid }))
            .await?;

        let node = data.get("product").cloned().unwrap_or(serde_json::Value::Null);
        if node.is_null() {
            return Err(AttribflowError::ProductNotFound(product_id.to_string()));
        }

        let product: ProductNode = serde_json::from_value(node)?;
        debug!(product_id = product_id, tags = product.tags.len(), "Fetched product state");

        Ok(ProductState {
            id: product.id,
            title: product.title,
            tags: product.tags,
            updated_at: product.updated_at,
        })
    }

    async fn update_product(
        &self,
        product_id: &str,
        tags: &[String],
        title: &str,
    ) -> Result<(), AttribflowError> {
        let gid = Self::product_gid(product_id);
        let data = self
            .post_graphql(
                PRODUCT_UPDATE_MUTATION,
                json!({ "input": { "id": gid, "tags": tags, "title": title } }),
            )
            .await?;

        let user_errors: Vec<UserError> = data
            .pointer("/productUpdate/userErrors")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();

        if !user_errors.is_empty() {
            let detail: Vec<String> = user_errors
                .into_iter()
                .map(|e| {
                    let field = e.field.unwrap_or_default().join(".");
                    if field.is_empty() {
                        e.message
                    } else {
                        format!("{}: {}", field, e.message)
                    }
                })
                .collect();
            return Err(AttribflowError::UserErrors(detail.join("; ")));
        }

        Ok(())
    }
}

/// In-memory product API for tests: serves scripted states and records
/// every write it receives.
pub struct MockProductApi {
    products: Mutex<std::collections::HashMap<String, ProductState>>,
    updates: Mutex<Vec<(String, Vec<String>, String)>>,
    reads: Mutex<usize>,
    /// Number of upcoming get_product calls to fail with ProductNotFound,
    /// simulating storefront eventual-consistency lag
    unavailable_reads: Mutex<u32>,
}

impl MockProductApi {
    pub fn new() -> Self {
        Self {
            products: Mutex::new(std::collections::HashMap::new()),
            updates: Mutex::new(Vec::new()),
            reads: Mutex::new(0),
            unavailable_reads: Mutex::new(0),
        }
    }

    pub async fn insert(&self, state: ProductState) {
        self.products.lock().await.insert(state.id.clone(), state);
    }

    pub async fn fail_next_reads(&self, count: u32) {
        *self.unavailable_reads.lock().await = count;
    }

    pub async fn recorded_updates(&self) -> Vec<(String, Vec<String>, String)> {
        self.updates.lock().await.clone()
    }

    pub async fn update_count(&self) -> usize {
        self.updates.lock().await.len()
    }

    pub async fn read_count(&self) -> usize {
        *self.reads.lock().await
    }
}

impl Default for MockProductApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductApi for MockProductApi {
    async fn get_product(&self, product_id: &str) -> Result<ProductState, AttribflowError> {
        *self.reads.lock().await += 1;
        {
            let mut pending = self.unavailable_reads.lock().await;
            if *pending > 0 {
                *pending -= 1;
                return Err(AttribflowError::ProductNotFound(product_id.to_string()));
            }
        }
        self.products
            .lock()
            .await
            .get(product_id)
            .cloned()
            .ok_or_else(|| AttribflowError::ProductNotFound(product_id.to_string()))
    }

    async fn update_product(
        &self,
        product_id: &str,
        tags: &[String],
        title: &str,
    ) -> Result<(), AttribflowError> {
        let mut products = self.products.lock().await;
        let state = products
            .get_mut(product_id)
            .ok_or_else(|| AttribflowError::ProductNotFound(product_id.to_string()))?;
        state.tags = tags.to_vec();
        state.title = title.to_string();

        self.updates
            .lock()
            .await
            .push((product_id.to_string(), tags.to_vec(), title.to_string()));
        Ok(())
    }
}
