/// Tag/Title Reconciliation Engine
///
/// Computes the minimal tag/title delta bringing a product to its target
/// attributed state and applies it through the product API only when the
/// state actually differs. Re-applying to an already-correct product is a
/// reported no-op, not a write.
mod tags;
mod title;

pub use tags::{plan_tags, same_tag_set};
pub use title::{company_label, plan_title};

use crate::constants::PENDING_ATTRIBUTION_TAG;
use crate::eligibility::is_pro_tag;
use crate::error::AttribflowError;
use crate::models::{Attribution, MarkingDirective, ProductState};
use crate::services::shopify::ProductApi;
use crate::utils::retry::{RetryPolicy, retry_with_policy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The state a product should converge to
#[derive(Debug, Clone)]
pub struct ReconcileTarget {
    pub customer_tag: String,
    pub directive: MarkingDirective,
    pub seed_tags: Vec<String>,
}

impl ReconcileTarget {
    pub fn new(customer_tag: impl Into<String>) -> Self {
        Self {
            customer_tag: customer_tag.into(),
            directive: MarkingDirective::Unspecified,
            seed_tags: Vec::new(),
        }
    }

    pub fn from_attribution(attribution: &Attribution) -> Self {
        Self {
            customer_tag: attribution.customer_tag.clone(),
            directive: attribution.marking,
            seed_tags: attribution.seed_marking_tags.clone(),
        }
    }
}

/// Reconciliation result reported inline to callers.
///
/// Exhausted retries surface as `Failed`: a structured outcome, never a
/// fault that would turn the request into a 500.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ReconcileOutcome {
    Updated { tags: Vec<String>, title: String },
    NothingToDo,
    Failed { error: String },
}

impl ReconcileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub struct Reconciler {
    api: Arc<dyn ProductApi>,
    policy: RetryPolicy,
    verify_after_write: bool,
}

impl Reconciler {
    pub fn new(api: Arc<dyn ProductApi>) -> Self {
        Self {
            api,
            policy: RetryPolicy::reconcile_default(),
            verify_after_write: true,
        }
    }

    pub fn with_policy(api: Arc<dyn ProductApi>, policy: RetryPolicy, verify_after_write: bool) -> Self {
        Self {
            api,
            policy,
            verify_after_write,
        }
    }

    /// Fetch current state, compute next state, write only if different.
    pub async fn reconcile(&self, product_id: &str, target: &ReconcileTarget) -> ReconcileOutcome {
        match self.try_reconcile(product_id, target).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    product_id = product_id,
                    customer_tag = %target.customer_tag,
                    error = %e,
                    "Reconciliation failed"
                );
                ReconcileOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn try_reconcile(
        &self,
        product_id: &str,
        target: &ReconcileTarget,
    ) -> Result<ReconcileOutcome, AttribflowError> {
        // A product fresh out of the webhook may not be queryable yet; the
        // fetch retries absorb that eventual-consistency lag.
        let current = retry_with_policy(
            || self.api.get_product(product_id),
            self.policy,
            "product_fetch",
        )
        .await?;

        let next_tags = plan_tags(
            &current.tags,
            &target.customer_tag,
            target.directive,
            &target.seed_tags,
        );
        let next_title = self.compute_title(&current, target);

        if same_tag_set(&current.tags, &next_tags) && current.title == next_title {
            info!(product_id = product_id, "Product already in target state");
            return Ok(ReconcileOutcome::NothingToDo);
        }

        retry_with_policy(
            || self.api.update_product(product_id, &next_tags, &next_title),
            self.policy,
            "product_update",
        )
        .await?;

        info!(
            product_id = product_id,
            customer_tag = %target.customer_tag,
            title = %next_title,
            "Product reconciled"
        );

        if self.verify_after_write {
            self.verify_markings(product_id, target).await;
        }

        Ok(ReconcileOutcome::Updated {
            tags: next_tags,
            title: next_title,
        })
    }

    fn compute_title(&self, current: &ProductState, target: &ReconcileTarget) -> String {
        // Companies of pro tags being replaced; their prefixes are stale
        let stale_companies: Vec<String> = current
            .tags
            .iter()
            .filter(|t| is_pro_tag(t) && t.as_str() != target.customer_tag)
            .map(|t| company_label(t))
            .collect();

        plan_title(
            &current.title,
            &company_label(&target.customer_tag),
            target.directive,
            &stale_companies,
        )
    }

    /// The platform has been observed dropping marking tags right after an
    /// update. Re-read once and re-apply if the marking state regressed.
    async fn verify_markings(&self, product_id: &str, target: &ReconcileTarget) {
        let state = match self.api.get_product(product_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!(product_id = product_id, error = %e, "Post-write verification read failed");
                return;
            }
        };

        let next_tags = plan_tags(
            &state.tags,
            &target.customer_tag,
            target.directive,
            &target.seed_tags,
        );
        let next_title = self.compute_title(&state, target);

        if same_tag_set(&state.tags, &next_tags) && state.title == next_title {
            return;
        }

        warn!(
            product_id = product_id,
            "Marking state regressed after write, re-applying once"
        );
        if let Err(e) = self
            .api
            .update_product(product_id, &next_tags, &next_title)
            .await
        {
            warn!(product_id = product_id, error = %e, "Re-apply after verification failed");
        }
    }

    /// Flags a product whose attribution is still unknown with the transient
    /// workflow marker, so it can be found for manual reconciliation later.
    /// Never touches a product that already carries a pro tag.
    pub async fn mark_pending(&self, product_id: &str) -> ReconcileOutcome {
        let current = match retry_with_policy(
            || self.api.get_product(product_id),
            self.policy,
            "product_fetch",
        )
        .await
        {
            Ok(state) => state,
            Err(e) => {
                return ReconcileOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        if current.tags.iter().any(|t| is_pro_tag(t))
            || current.tags.iter().any(|t| t == PENDING_ATTRIBUTION_TAG)
        {
            return ReconcileOutcome::NothingToDo;
        }

        let mut next_tags = current.tags.clone();
        next_tags.push(PENDING_ATTRIBUTION_TAG.to_string());

        match self
            .api
            .update_product(product_id, &next_tags, &current.title)
            .await
        {
            Ok(()) => ReconcileOutcome::Updated {
                tags: next_tags,
                title: current.title,
            },
            Err(e) => ReconcileOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}
