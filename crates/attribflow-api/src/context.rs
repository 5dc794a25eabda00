/// API Context - shared state for all API handlers
use attribflow_core::models::AppConfig;
use attribflow_core::reconcile::Reconciler;
use attribflow_core::resolver::Resolver;
use attribflow_core::services::shopify::{ProductApi, ShopifyClient};
use attribflow_core::store::{AttributionStore, MemoryStore};
use attribflow_core::utils::retry::RetryPolicy;
use lambda_http::Error;
use std::sync::Arc;

/// Shared resources for API handlers.
///
/// The store and product API sit behind trait objects so tests (and a
/// future durable backend) can swap them without touching the handlers.
pub struct ApiContext {
    pub config: AppConfig,
    pub store: Arc<dyn AttributionStore>,
    pub reconciler: Reconciler,
    pub resolver: Resolver,
}

impl ApiContext {
    /// Create the production context from environment configuration
    pub async fn new() -> Result<Arc<Self>, Error> {
        let config = AppConfig::from_env()?;
        let store: Arc<dyn AttributionStore> = Arc::new(MemoryStore::new());
        let products: Arc<dyn ProductApi> = Arc::new(ShopifyClient::new(&config));

        Ok(Self::with_parts(config, store, products))
    }

    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn AttributionStore>,
        products: Arc<dyn ProductApi>,
    ) -> Arc<Self> {
        Self::with_policies(
            config,
            store,
            products,
            RetryPolicy::reconcile_default(),
            RetryPolicy::resolver_default(),
            true,
        )
    }

    /// Full constructor with explicit retry policies; tests pass millisecond
    /// delays here instead of sleeping in real time.
    pub fn with_policies(
        config: AppConfig,
        store: Arc<dyn AttributionStore>,
        products: Arc<dyn ProductApi>,
        reconcile_policy: RetryPolicy,
        resolver_policy: RetryPolicy,
        verify_after_write: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            reconciler: Reconciler::with_policy(
                products,
                reconcile_policy,
                verify_after_write,
            ),
            resolver: Resolver::with_policy(Arc::clone(&store), resolver_policy),
            config,
            store,
        })
    }
}
