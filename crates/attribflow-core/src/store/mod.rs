/// Ephemeral attribution store - keyed, TTL-bounded, in-memory holding area
/// for attribution and heartbeat records.
///
/// Explicitly not durable: a process restart loses all state. That is an
/// accepted limitation of the deployment model. The store still sits behind
/// a trait so a durable backend can be substituted without touching the
/// resolver or endpoint contracts.
mod memory;

pub use memory::{MemoryStore, StoreTtls};

use crate::error::AttribflowError;
use crate::models::{Attribution, Heartbeat};
use async_trait::async_trait;
use std::time::Duration;

/// Entry counts per index, for health/debug reporting
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub by_design: usize,
    pub by_product: usize,
    pub by_session: usize,
    pub heartbeats: usize,
}

#[async_trait]
pub trait AttributionStore: Send + Sync {
    /// Indexes the record under every key it carries (design id, product id,
    /// session id). A session-keyed record that already exists is kept and
    /// its design-id list extended instead of being overwritten.
    async fn put_link(&self, record: Attribution) -> Result<(), AttribflowError>;

    async fn get_by_design(&self, design_id: &str) -> Result<Option<Attribution>, AttribflowError>;

    async fn get_by_product(
        &self,
        product_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError>;

    async fn get_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError>;

    /// Finds the session-keyed record whose design-activity list contains
    /// the given design id (resolver priority 3).
    async fn find_session_for_design(
        &self,
        design_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError>;

    async fn delete_by_design(&self, design_id: &str) -> Result<(), AttribflowError>;

    async fn delete_by_product(&self, product_id: &str) -> Result<(), AttribflowError>;

    async fn delete_by_session(&self, session_id: &str) -> Result<(), AttribflowError>;

    /// Creates or refreshes the single heartbeat for a customer id
    async fn upsert_heartbeat(&self, heartbeat: Heartbeat) -> Result<(), AttribflowError>;

    async fn get_heartbeat(
        &self,
        customer_id: &str,
    ) -> Result<Option<Heartbeat>, AttribflowError>;

    /// Most recently active heartbeat within the recency window, if any
    async fn latest_heartbeat(
        &self,
        within: Duration,
    ) -> Result<Option<Heartbeat>, AttribflowError>;

    /// Stamps a cooldown key. Returns true when the key was stamped within
    /// the window already; the caller should then treat the request as a
    /// duplicate and skip its side effects.
    async fn check_cooldown(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<bool, AttribflowError>;

    /// Sweeps every index, removing entries whose age exceeds their TTL.
    /// Cheap enough to run opportunistically on every write.
    async fn sweep(&self) -> Result<(), AttribflowError>;

    async fn counts(&self) -> Result<StoreCounts, AttribflowError>;
}
