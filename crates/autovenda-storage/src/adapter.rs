// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use autovenda_config::model::StorageConfig;
use autovenda_core::types::{
    ActivationResult, OnboardingRecord, OnboardingUpdate, Role, StoredMessage, Subscription,
    UserProfile,
};
use autovenda_core::{AdapterType, AutovendaError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on [`StorageAdapter::initialize`]; every other
/// operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, AutovendaError> {
        self.db.get().ok_or_else(|| AutovendaError::Persistence {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), AutovendaError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| AutovendaError::Persistence {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), AutovendaError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn append_message(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
    ) -> Result<i64, AutovendaError> {
        queries::history::append_message(self.db()?, user_id, role, content).await
    }

    async fn recent_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, AutovendaError> {
        queries::history::recent_messages(self.db()?, user_id, limit).await
    }

    async fn upsert_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        contact_handle: Option<&str>,
    ) -> Result<(), AutovendaError> {
        queries::users::upsert_user(self.db()?, user_id, display_name, contact_handle).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AutovendaError> {
        queries::users::get_user(self.db()?, user_id).await
    }

    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<(), AutovendaError> {
        queries::users::set_display_name(self.db()?, user_id, name).await
    }

    async fn get_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, AutovendaError> {
        queries::subscriptions::get_subscription(self.db()?, user_id).await
    }

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AutovendaError> {
        queries::subscriptions::list_subscriptions(self.db()?).await
    }

    async fn record_plan_interest(
        &self,
        user_id: &str,
        plan: &str,
        monthly_price: f64,
    ) -> Result<usize, AutovendaError> {
        queries::subscriptions::record_plan_interest(self.db()?, user_id, plan, monthly_price).await
    }

    async fn mark_pending_payment(
        &self,
        user_id: &str,
        plan: &str,
        monthly_price: f64,
    ) -> Result<usize, AutovendaError> {
        queries::subscriptions::mark_pending_payment(self.db()?, user_id, plan, monthly_price).await
    }

    async fn activate_subscription(
        &self,
        user_id: &str,
        provider_subscription_id: &str,
        provider_customer_id: Option<&str>,
    ) -> Result<ActivationResult, AutovendaError> {
        queries::subscriptions::activate_subscription(
            self.db()?,
            user_id,
            provider_subscription_id,
            provider_customer_id,
        )
        .await
    }

    async fn reset_subscription(&self, user_id: &str) -> Result<usize, AutovendaError> {
        queries::subscriptions::reset_subscription(self.db()?, user_id).await
    }

    async fn get_onboarding(
        &self,
        user_id: &str,
    ) -> Result<Option<OnboardingRecord>, AutovendaError> {
        queries::onboarding::get_onboarding(self.db()?, user_id).await
    }

    async fn upsert_onboarding(
        &self,
        user_id: &str,
        update: &OnboardingUpdate,
    ) -> Result<(), AutovendaError> {
        queries::onboarding::upsert_onboarding(self.db()?, user_id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovenda_core::types::SubscriptionStatus;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("a.db").to_str().unwrap()));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("double.db").to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("none.db").to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        let err = storage.append_message("u1", Role::User, "oi").await.unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(dir.path().join("health.db").to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_lead_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let storage =
            SqliteStorage::new(make_config(dir.path().join("lifecycle.db").to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.upsert_user("42", Some("Ana"), Some("@ana")).await.unwrap();
        storage.append_message("42", Role::User, "quero o plano flash").await.unwrap();
        storage.record_plan_interest("42", "flash", 159.99).await.unwrap();
        storage.mark_pending_payment("42", "flash", 159.99).await.unwrap();
        assert_eq!(
            storage.activate_subscription("42", "sub_9", None).await.unwrap(),
            ActivationResult::Activated
        );

        let sub = storage.get_subscription("42").await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.monthly_price, Some(159.99));
        assert_eq!(storage.recent_messages("42", 10).await.unwrap().len(), 1);

        storage.close().await.unwrap();
        storage.shutdown().await.unwrap();
    }
}
