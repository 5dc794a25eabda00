/// Attribution Resolver
///
/// Given a product id and/or design id from a webhook payload, finds the
/// best available attribution by trying sources in strict
/// descending-confidence order and stopping at the first hit. "None" is a
/// normal outcome, not an error.
use crate::constants::HEARTBEAT_RECENCY_WINDOW;
use crate::error::AttribflowError;
use crate::models::Attribution;
use crate::store::AttributionStore;
use crate::utils::retry::RetryPolicy;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Which source produced the attribution, for logging and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    ProductKey,
    DesignKey,
    SessionActivity,
    RecentHeartbeat,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub attribution: Attribution,
    pub source: ResolutionSource,
}

pub struct Resolver {
    store: Arc<dyn AttributionStore>,
    policy: RetryPolicy,
}

impl Resolver {
    pub fn new(store: Arc<dyn AttributionStore>) -> Self {
        Self {
            store,
            policy: RetryPolicy::resolver_default(),
        }
    }

    pub fn with_policy(store: Arc<dyn AttributionStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolves with bounded retry-with-delay: a webhook can arrive before
    /// the link endpoint has written its binding, so a miss is re-attempted
    /// a few times before "none" is accepted as final.
    pub async fn resolve(
        &self,
        product_id: Option<&str>,
        design_id: Option<&str>,
    ) -> Result<Option<Resolution>, AttribflowError> {
        let mut attempt = 1;
        loop {
            if let Some(resolution) = self.resolve_once(product_id, design_id).await? {
                info!(
                    source = ?resolution.source,
                    customer_id = %resolution.attribution.customer_id,
                    "Attribution resolved"
                );
                return Ok(Some(resolution));
            }

            if attempt >= self.policy.max_attempts {
                info!(
                    product_id = product_id.unwrap_or("-"),
                    design_id = design_id.unwrap_or("-"),
                    attempts = attempt,
                    "No attribution found"
                );
                return Ok(None);
            }

            debug!(attempt = attempt, "Attribution miss, retrying after delay");
            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }

    /// One pass over the sources, highest confidence first
    async fn resolve_once(
        &self,
        product_id: Option<&str>,
        design_id: Option<&str>,
    ) -> Result<Option<Resolution>, AttribflowError> {
        if let Some(product_id) = product_id
            && let Some(attribution) = self.store.get_by_product(product_id).await?
        {
            return Ok(Some(Resolution {
                attribution,
                source: ResolutionSource::ProductKey,
            }));
        }

        if let Some(design_id) = design_id {
            if let Some(attribution) = self.store.get_by_design(design_id).await? {
                return Ok(Some(Resolution {
                    attribution,
                    source: ResolutionSource::DesignKey,
                }));
            }

            // A session whose design-activity list mentions the design
            if let Some(attribution) = self.store.find_session_for_design(design_id).await? {
                return Ok(Some(Resolution {
                    attribution,
                    source: ResolutionSource::SessionActivity,
                }));
            }
        }

        // Last resort: the most recently active Pro session
        if let Some(heartbeat) = self
            .store
            .latest_heartbeat(HEARTBEAT_RECENCY_WINDOW)
            .await?
        {
            return Ok(Some(Resolution {
                attribution: heartbeat.as_attribution(),
                source: ResolutionSource::RecentHeartbeat,
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttributionSource, Heartbeat, MarkingDirective};
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn record(
        tag: &str,
        design: Option<&str>,
        product: Option<&str>,
        session: Option<&str>,
    ) -> Attribution {
        Attribution {
            customer_id: format!("C-{}", tag),
            customer_email: "c@example.com".to_string(),
            customer_tag: tag.to_string(),
            product_id: product.map(String::from),
            design_ids: design.map(String::from).into_iter().collect(),
            session_id: session.map(String::from),
            marking: MarkingDirective::Unspecified,
            seed_marking_tags: Vec::new(),
            created_at: Utc::now(),
            source_ts: None,
            source: AttributionSource::LinkEndpoint,
        }
    }

    fn heartbeat(tag: &str) -> Heartbeat {
        Heartbeat {
            customer_id: format!("C-{}", tag),
            customer_email: "c@example.com".to_string(),
            pro_tag: tag.to_string(),
            company: "X".to_string(),
            last_seen: Utc::now(),
            last_action: None,
            session_token: "tok".to_string(),
        }
    }

    fn resolver(store: Arc<MemoryStore>) -> Resolver {
        Resolver::with_policy(store, RetryPolicy::new(1, 10))
    }

    #[tokio::test]
    async fn test_priority_product_beats_everything() {
        let store = Arc::new(MemoryStore::new());
        // Conflicting signals on every level at once
        store
            .put_link(record("proByProduct", None, Some("P1"), None))
            .await
            .unwrap();
        store
            .put_link(record("proByDesign", Some("D1"), None, None))
            .await
            .unwrap();
        store
            .put_link(record("proBySession", Some("D9"), None, Some("S1")))
            .await
            .unwrap();
        store.upsert_heartbeat(heartbeat("proByBeat")).await.unwrap();

        let resolution = resolver(store.clone())
            .resolve(Some("P1"), Some("D1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.source, ResolutionSource::ProductKey);
        assert_eq!(resolution.attribution.customer_tag, "proByProduct");
    }

    #[tokio::test]
    async fn test_priority_design_then_session_then_heartbeat() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_link(record("proByDesign", Some("D1"), None, None))
            .await
            .unwrap();
        store
            .put_link(record("proBySession", Some("D2"), None, Some("S1")))
            .await
            .unwrap();
        store.upsert_heartbeat(heartbeat("proByBeat")).await.unwrap();

        let r = resolver(store.clone());

        let by_design = r.resolve(None, Some("D1")).await.unwrap().unwrap();
        assert_eq!(by_design.source, ResolutionSource::DesignKey);

        // D2 only exists in the session record's activity list
        store.delete_by_design("D2").await.unwrap();
        let by_session = r.resolve(None, Some("D2")).await.unwrap().unwrap();
        assert_eq!(by_session.source, ResolutionSource::SessionActivity);
        assert_eq!(by_session.attribution.customer_tag, "proBySession");

        let by_beat = r.resolve(Some("P-unknown"), None).await.unwrap().unwrap();
        assert_eq!(by_beat.source, ResolutionSource::RecentHeartbeat);
        assert_eq!(by_beat.attribution.customer_tag, "proByBeat");
    }

    #[tokio::test]
    async fn test_none_is_a_normal_outcome() {
        let store = Arc::new(MemoryStore::new());
        let resolution = resolver(store).resolve(Some("P1"), Some("D1")).await.unwrap();
        assert!(resolution.is_none());
    }

    #[tokio::test]
    async fn test_retry_catches_late_link_write() {
        let store = Arc::new(MemoryStore::new());
        let r = Resolver::with_policy(store.clone(), RetryPolicy::new(3, 30));

        // The link write lands while the resolver is between attempts
        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(40)).await;
                store
                    .put_link(record("proLate", None, Some("P1"), None))
                    .await
                    .unwrap();
            })
        };

        let resolution = r.resolve(Some("P1"), None).await.unwrap();
        writer.await.unwrap();

        let resolution = resolution.expect("late write should be caught by retry");
        assert_eq!(resolution.attribution.customer_tag, "proLate");
    }

    #[tokio::test]
    async fn test_records_survive_resolution() {
        // Records are kept until TTL expiry rather than consumed on use, so
        // repeated webhook deliveries keep resolving.
        let store = Arc::new(MemoryStore::new());
        store
            .put_link(record("proAcme", Some("D1"), Some("P1"), None))
            .await
            .unwrap();

        let r = resolver(store.clone());
        assert!(r.resolve(Some("P1"), None).await.unwrap().is_some());
        assert!(r.resolve(Some("P1"), None).await.unwrap().is_some());
        assert!(store.get_by_product("P1").await.unwrap().is_some());
    }
}
