// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full conversation stack with mock adapters,
//! a temp SQLite database and the skills shipped in the repository.
//! `send_message()` drives one turn through the orchestrator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autovenda_agent::{Orchestrator, TurnOutput};
use autovenda_billing::{ActivationNotice, PaymentSessionBroker, SubscriptionGate};
use autovenda_config::model::{AgentConfig, StorageConfig};
use autovenda_core::plans::CATALOG;
use autovenda_core::types::{HistoryEntry, TransitionOutcome};
use autovenda_core::{AutovendaError, StorageAdapter};
use autovenda_skill::{HookContext, SkillRegistry};
use autovenda_storage::{HistoryStore, SqliteStorage};
use tokio::sync::mpsc;

use crate::mock_channel::{inbound, MockChannel};
use crate::mock_payment::{completed_event, MockPaymentGateway};
use crate::mock_provider::MockProvider;

/// Skill manifests shipped with the workspace.
pub fn skills_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skills")
}

/// Price references for every catalog plan: `price_<slug>`.
pub fn test_prices() -> BTreeMap<String, String> {
    CATALOG
        .iter()
        .map(|p| (p.slug.to_string(), format!("price_{}", p.slug)))
        .collect()
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    prices: BTreeMap<String, String>,
    skills_dir: PathBuf,
    agent: AgentConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            prices: test_prices(),
            skills_dir: skills_dir(),
            agent: AgentConfig::default(),
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the plan price map.
    pub fn with_prices(mut self, prices: BTreeMap<String, String>) -> Self {
        self.prices = prices;
        self
    }

    /// Load skills from another directory.
    pub fn with_skills_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.skills_dir = dir.into();
        self
    }

    pub fn with_agent_config(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AutovendaError> {
        let temp_dir = tempfile::TempDir::new().map_err(AutovendaError::persistence)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: false,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let (registry, errors) = SkillRegistry::load(&self.skills_dir);
        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }
        let registry = Arc::new(registry);

        let mock_gateway = Arc::new(MockPaymentGateway::new());
        let (notice_tx, notice_rx) = mpsc::channel(16);
        let broker = Arc::new(
            PaymentSessionBroker::new(
                mock_gateway.clone(),
                SubscriptionGate::new(storage.clone()),
                self.prices,
            )
            .with_notices(notice_tx),
        );

        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));
        let hooks = HookContext {
            storage: storage.clone(),
            broker: broker.clone(),
            persona: self.agent.name.clone(),
        };
        let history = HistoryStore::new(storage.clone(), self.agent.history_window);
        let orchestrator = Arc::new(Orchestrator::new(
            history,
            registry,
            mock_provider.clone(),
            hooks,
            self.agent,
        ));

        Ok(TestHarness {
            mock_provider,
            mock_channel: Arc::new(MockChannel::new()),
            mock_gateway,
            storage,
            broker,
            orchestrator,
            notices: Some(notice_rx),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub mock_provider: Arc<MockProvider>,
    pub mock_channel: Arc<MockChannel>,
    pub mock_gateway: Arc<MockPaymentGateway>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub broker: Arc<PaymentSessionBroker>,
    pub orchestrator: Arc<Orchestrator>,
    /// Activation notices from `broker`; take it to drive an agent loop.
    pub notices: Option<mpsc::Receiver<ActivationNotice>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one turn for `user_id` through the orchestrator.
    pub async fn send_message(&self, user_id: &str, text: &str) -> TurnOutput {
        self.orchestrator.handle_turn(&inbound(user_id, text)).await
    }

    /// Deliver a paid checkout-completed event for `user_id`.
    pub async fn complete_payment(
        &self,
        user_id: &str,
    ) -> Result<TransitionOutcome, AutovendaError> {
        self.broker.reconcile(&completed_event(user_id)).await
    }

    /// Stored history for `user_id`, oldest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, AutovendaError> {
        self.orchestrator.recent(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovenda_core::types::SubscriptionStatus;

    #[tokio::test]
    async fn harness_loads_shipped_skills() {
        let harness = TestHarness::builder().build().await.unwrap();
        let names: Vec<_> = harness
            .orchestrator
            .registry()
            .list()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(
            names,
            vec!["brand_identity", "lead_qualify", "onboarding", "proposals"]
        );
    }

    #[tokio::test]
    async fn complete_payment_activates_pending_user() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness
            .broker
            .create_session("42", "flash", None)
            .await
            .unwrap();
        assert_eq!(
            harness.complete_payment("42").await.unwrap(),
            TransitionOutcome::Activated
        );
        assert_eq!(
            harness.broker.gate().status("42").await.unwrap(),
            Some(SubscriptionStatus::Active)
        );
    }
}
