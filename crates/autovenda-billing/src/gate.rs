// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription lifecycle gate: `lead -> pending_payment -> active`.

use std::sync::Arc;

use autovenda_core::plans::Plan;
use autovenda_core::types::{ActivationResult, SubscriptionStatus, TransitionOutcome};
use autovenda_core::{AutovendaError, StorageAdapter};
use tracing::{debug, info};

/// Tracks each user's lifecycle state and answers gating questions.
///
/// All transitions are single-row conditional writes in the store, so two
/// execution contexts (chat turns and webhooks) can drive the same row.
#[derive(Clone)]
pub struct SubscriptionGate {
    storage: Arc<dyn StorageAdapter>,
}

impl SubscriptionGate {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Current status, or `None` when the user never showed plan interest.
    pub async fn status(&self, user_id: &str) -> Result<Option<SubscriptionStatus>, AutovendaError> {
        Ok(self
            .storage
            .get_subscription(user_id)
            .await?
            .map(|sub| sub.status))
    }

    pub async fn is_active(&self, user_id: &str) -> Result<bool, AutovendaError> {
        Ok(self.status(user_id).await? == Some(SubscriptionStatus::Active))
    }

    /// Record interest in a plan. Only creates or re-plans `lead` rows.
    pub async fn record_interest(&self, user_id: &str, plan: &Plan) -> Result<bool, AutovendaError> {
        let rows = self
            .storage
            .record_plan_interest(user_id, plan.slug, plan.price())
            .await?;
        debug!(user_id, plan = plan.slug, rows, "plan interest recorded");
        Ok(rows == 1)
    }

    /// `lead -> pending_payment` after a checkout session exists.
    ///
    /// Returns `false` when the row is already `active`; its plan is left alone.
    pub async fn begin_checkout(&self, user_id: &str, plan: &Plan) -> Result<bool, AutovendaError> {
        let rows = self
            .storage
            .mark_pending_payment(user_id, plan.slug, plan.price())
            .await?;
        if rows == 1 {
            info!(user_id, plan = plan.slug, "subscription awaiting payment");
        }
        Ok(rows == 1)
    }

    /// `pending_payment -> active`, idempotent.
    pub async fn activate(
        &self,
        user_id: &str,
        provider_subscription_id: &str,
        provider_customer_id: Option<&str>,
    ) -> Result<TransitionOutcome, AutovendaError> {
        let result = self
            .storage
            .activate_subscription(user_id, provider_subscription_id, provider_customer_id)
            .await?;
        Ok(match result {
            ActivationResult::Activated => TransitionOutcome::Activated,
            ActivationResult::AlreadyActive => TransitionOutcome::AlreadyActive,
            ActivationResult::NotFound => TransitionOutcome::UserNotFound,
            ActivationResult::NotPending(_) => {
                TransitionOutcome::Rejected("no pending checkout".to_string())
            }
        })
    }

    /// Administrative reset to `lead`. Returns whether a row existed.
    pub async fn reset(&self, user_id: &str) -> Result<bool, AutovendaError> {
        let rows = self.storage.reset_subscription(user_id).await?;
        if rows > 0 {
            info!(user_id, "subscription reset to lead");
        }
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovenda_config::model::StorageConfig;
    use autovenda_core::plans::{FLASH, SECRETARIA_VIRTUAL};
    use autovenda_storage::SqliteStorage;
    use tempfile::tempdir;

    async fn gate(dir: &tempfile::TempDir) -> SubscriptionGate {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("gate.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        SubscriptionGate::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn mention_alone_does_not_advance() {
        let dir = tempdir().unwrap();
        let gate = gate(&dir).await;
        assert_eq!(gate.status("u1").await.unwrap(), None);

        gate.record_interest("u1", &FLASH).await.unwrap();
        assert_eq!(gate.status("u1").await.unwrap(), Some(SubscriptionStatus::Lead));
        assert!(!gate.is_active("u1").await.unwrap());
    }

    #[tokio::test]
    async fn full_forward_path() {
        let dir = tempdir().unwrap();
        let gate = gate(&dir).await;

        assert!(gate.begin_checkout("u1", &SECRETARIA_VIRTUAL).await.unwrap());
        assert_eq!(
            gate.status("u1").await.unwrap(),
            Some(SubscriptionStatus::PendingPayment)
        );
        assert_eq!(
            gate.activate("u1", "sub_1", None).await.unwrap(),
            TransitionOutcome::Activated
        );
        assert_eq!(
            gate.activate("u1", "sub_1", None).await.unwrap(),
            TransitionOutcome::AlreadyActive
        );
        assert!(gate.is_active("u1").await.unwrap());
        assert!(!gate.begin_checkout("u1", &FLASH).await.unwrap());
    }

    #[tokio::test]
    async fn activation_requires_pending_row() {
        let dir = tempdir().unwrap();
        let gate = gate(&dir).await;

        assert_eq!(
            gate.activate("ghost", "sub_1", None).await.unwrap(),
            TransitionOutcome::UserNotFound
        );
        gate.record_interest("u1", &FLASH).await.unwrap();
        assert_eq!(
            gate.activate("u1", "sub_1", None).await.unwrap(),
            TransitionOutcome::Rejected("no pending checkout".into())
        );
    }

    #[tokio::test]
    async fn reset_is_the_only_way_back() {
        let dir = tempdir().unwrap();
        let gate = gate(&dir).await;
        gate.begin_checkout("u1", &FLASH).await.unwrap();
        gate.activate("u1", "sub_1", None).await.unwrap();

        assert!(gate.reset("u1").await.unwrap());
        assert!(!gate.reset("nobody").await.unwrap());
        assert_eq!(gate.status("u1").await.unwrap(), Some(SubscriptionStatus::Lead));
    }
}
