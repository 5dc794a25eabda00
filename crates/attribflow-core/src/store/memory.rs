/// In-memory store implementation, process-wide behind an async mutex
use super::{AttributionStore, StoreCounts};
use crate::constants::{ATTRIBUTION_TTL, HEARTBEAT_TTL};
use crate::error::AttribflowError;
use crate::models::{Attribution, Heartbeat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// TTLs applied by the sweep; overridable so tests can use short windows
#[derive(Debug, Clone)]
pub struct StoreTtls {
    pub attribution: Duration,
    pub heartbeat: Duration,
}

impl Default for StoreTtls {
    fn default() -> Self {
        Self {
            attribution: ATTRIBUTION_TTL,
            heartbeat: HEARTBEAT_TTL,
        }
    }
}

#[derive(Default)]
struct Inner {
    by_design: HashMap<String, Attribution>,
    by_product: HashMap<String, Attribution>,
    by_session: HashMap<String, Attribution>,
    heartbeats: HashMap<String, Heartbeat>,
    /// Cooldown/debounce stamps keyed by caller-chosen strings
    stamps: HashMap<String, DateTime<Utc>>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    ttls: StoreTtls,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ttls(StoreTtls::default())
    }

    pub fn with_ttls(ttls: StoreTtls) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttls,
        }
    }

    fn expired(created_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - created_at).to_std().map_or(false, |age| age > ttl)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttributionStore for MemoryStore {
    async fn put_link(&self, record: Attribution) -> Result<(), AttribflowError> {
        let mut inner = self.inner.lock().await;

        for design_id in &record.design_ids {
            inner.by_design.insert(design_id.clone(), record.clone());
        }
        if let Some(product_id) = &record.product_id {
            inner.by_product.insert(product_id.clone(), record.clone());
        }
        if let Some(session_id) = record.session_id.clone() {
            match inner.by_session.get_mut(&session_id) {
                Some(existing) => {
                    // Append newly observed design ids to the session record
                    for design_id in &record.design_ids {
                        if !existing.design_ids.contains(design_id) {
                            existing.design_ids.push(design_id.clone());
                        }
                    }
                }
                None => {
                    inner.by_session.insert(session_id, record);
                }
            }
        }
        Ok(())
    }

    async fn get_by_design(
        &self,
        design_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .by_design
            .get(design_id)
            .filter(|r| !Self::expired(r.created_at, self.ttls.attribution, now))
            .cloned())
    }

    async fn get_by_product(
        &self,
        product_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .by_product
            .get(product_id)
            .filter(|r| !Self::expired(r.created_at, self.ttls.attribution, now))
            .cloned())
    }

    async fn get_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .by_session
            .get(session_id)
            .filter(|r| !Self::expired(r.created_at, self.ttls.attribution, now))
            .cloned())
    }

    async fn find_session_for_design(
        &self,
        design_id: &str,
    ) -> Result<Option<Attribution>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .by_session
            .values()
            .filter(|r| !Self::expired(r.created_at, self.ttls.attribution, now))
            .find(|r| r.design_ids.iter().any(|d| d == design_id))
            .cloned())
    }

    async fn delete_by_design(&self, design_id: &str) -> Result<(), AttribflowError> {
        self.inner.lock().await.by_design.remove(design_id);
        Ok(())
    }

    async fn delete_by_product(&self, product_id: &str) -> Result<(), AttribflowError> {
        self.inner.lock().await.by_product.remove(product_id);
        Ok(())
    }

    async fn delete_by_session(&self, session_id: &str) -> Result<(), AttribflowError> {
        self.inner.lock().await.by_session.remove(session_id);
        Ok(())
    }

    async fn upsert_heartbeat(&self, heartbeat: Heartbeat) -> Result<(), AttribflowError> {
        let mut inner = self.inner.lock().await;
        inner
            .heartbeats
            .insert(heartbeat.customer_id.clone(), heartbeat);
        Ok(())
    }

    async fn get_heartbeat(
        &self,
        customer_id: &str,
    ) -> Result<Option<Heartbeat>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .heartbeats
            .get(customer_id)
            .filter(|h| !Self::expired(h.last_seen, self.ttls.heartbeat, now))
            .cloned())
    }

    async fn latest_heartbeat(
        &self,
        within: Duration,
    ) -> Result<Option<Heartbeat>, AttribflowError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        Ok(inner
            .heartbeats
            .values()
            .filter(|h| !Self::expired(h.last_seen, within, now))
            .max_by_key(|h| h.last_seen)
            .cloned())
    }

    async fn check_cooldown(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<bool, AttribflowError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();

        if let Some(stamped_at) = inner.stamps.get(key)
            && !Self::expired(*stamped_at, window, now)
        {
            debug!(key = key, "Cooldown hit");
            return Ok(true);
        }

        inner.stamps.insert(key.to_string(), now);
        Ok(false)
    }

    async fn sweep(&self) -> Result<(), AttribflowError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let attribution_ttl = self.ttls.attribution;
        let heartbeat_ttl = self.ttls.heartbeat;

        inner
            .by_design
            .retain(|_, r| !Self::expired(r.created_at, attribution_ttl, now));
        inner
            .by_product
            .retain(|_, r| !Self::expired(r.created_at, attribution_ttl, now));
        inner
            .by_session
            .retain(|_, r| !Self::expired(r.created_at, attribution_ttl, now));
        inner
            .heartbeats
            .retain(|_, h| !Self::expired(h.last_seen, heartbeat_ttl, now));
        // Stamps carry their own short windows; anything older than the
        // attribution TTL is long dead either way.
        inner
            .stamps
            .retain(|_, at| !Self::expired(*at, attribution_ttl, now));

        Ok(())
    }

    async fn counts(&self) -> Result<StoreCounts, AttribflowError> {
        let inner = self.inner.lock().await;
        Ok(StoreCounts {
            by_design: inner.by_design.len(),
            by_product: inner.by_product.len(),
            by_session: inner.by_session.len(),
            heartbeats: inner.heartbeats.len(),
        })
    }
}
