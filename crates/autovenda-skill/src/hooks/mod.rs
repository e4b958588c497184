// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic extraction hooks bound to skills.
//!
//! Each hook reads the user's text plus recent history, extracts structured
//! fields with fixed rules and may run idempotent side effects (upserts,
//! checkout creation). The set of hooks is closed: a skill definition names
//! one by its snake_case tag.

pub mod brand_guard;
pub mod lead_qualify;
pub mod onboarding;
pub mod proposal;

use std::sync::Arc;

use autovenda_billing::{PaymentSessionBroker, SubscriptionGate};
use autovenda_core::types::{HistoryEntry, Role};
use autovenda_core::StorageAdapter;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use lead_qualify::LeadProfile;
pub use onboarding::OnboardingSummary;
pub use proposal::{PaymentPayload, ProposalResult};

/// Number of history entries appended to the user text for extraction.
pub const COMBINED_HISTORY: usize = 6;

/// The closed set of hook implementations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    LeadQualify,
    Proposal,
    Onboarding,
    BrandGuard,
}

impl Hook {
    /// Run the hook for one turn.
    ///
    /// `None` means the hook had nothing to contribute (no plan mentioned,
    /// no brand rule fired).
    pub async fn run(self, ctx: &HookContext, input: &HookInput<'_>) -> Option<HookOutcome> {
        match self {
            Self::LeadQualify => lead_qualify::run(input),
            Self::Proposal => proposal::run(ctx, input).await,
            Self::Onboarding => Some(onboarding::run(ctx, input).await),
            Self::BrandGuard => brand_guard::run(ctx, input),
        }
    }
}

/// Collaborators hooks may use for side effects.
#[derive(Clone)]
pub struct HookContext {
    pub storage: Arc<dyn StorageAdapter>,
    pub broker: Arc<PaymentSessionBroker>,
    /// Persona name used in canned replies.
    pub persona: String,
}

impl HookContext {
    pub fn gate(&self) -> &SubscriptionGate {
        self.broker.gate()
    }
}

/// One turn's input as seen by a hook.
#[derive(Debug, Clone, Copy)]
pub struct HookInput<'a> {
    pub user_id: &'a str,
    pub text: &'a str,
    /// Oldest-first recent window, not including `text`.
    pub history: &'a [HistoryEntry],
}

impl<'a> HookInput<'a> {
    pub fn new(user_id: &'a str, text: &'a str, history: &'a [HistoryEntry]) -> Self {
        Self {
            user_id,
            text,
            history,
        }
    }

    /// The newest [`COMBINED_HISTORY`] entries, oldest first.
    pub fn tail(&self) -> &'a [HistoryEntry] {
        let start = self.history.len().saturating_sub(COMBINED_HISTORY);
        &self.history[start..]
    }

    /// User text followed by the tail of history, newline separated.
    pub fn combined(&self) -> String {
        let mut combined = self.text.to_string();
        for entry in self.tail() {
            combined.push('\n');
            combined.push_str(&entry.content);
        }
        combined
    }

    /// Like [`combined`](Self::combined) but keeps only user-authored
    /// entries, so contact fields never come from the assistant's replies.
    pub fn user_combined(&self) -> String {
        let mut combined = self.text.to_string();
        for entry in self.tail().iter().filter(|e| e.role == Role::User) {
            combined.push('\n');
            combined.push_str(&entry.content);
        }
        combined
    }
}

/// Tagged result of one hook run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum HookOutcome {
    Complete(HookData),
    /// Field names still needed, in a fixed per-hook order.
    Missing(Vec<String>),
    Blocked(String),
    Error(HookFailure),
}

impl HookOutcome {
    pub(crate) fn missing(fields: &[&str]) -> Self {
        Self::Missing(fields.iter().map(|f| f.to_string()).collect())
    }
}

/// Structured data produced by a completed hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookData {
    Lead(LeadProfile),
    Proposal(ProposalResult),
    Onboarding(OnboardingSummary),
    /// A canned reply that replaces free-form content.
    Notice { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The plan has no provider price mapping.
    UnknownPlan,
    /// The payment provider could not open a checkout.
    Checkout,
    /// The user already pays for a plan; no new checkout was opened.
    AlreadySubscribed,
    /// A store or other internal failure.
    Internal,
}

/// Describes a failed side effect without aborting the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Progress made before the failure, shown to the user when present.
    pub partial: Option<Box<HookData>>,
}

impl HookFailure {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Internal,
            message: message.into(),
            partial: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use autovenda_billing::{PaymentSessionBroker, SubscriptionGate};
    use autovenda_config::model::StorageConfig;
    use autovenda_core::types::{
        AdapterType, CheckoutRequest, CheckoutSession, HealthStatus, PaymentEvent,
    };
    use autovenda_core::{AutovendaError, PaymentGateway, PluginAdapter, StorageAdapter};
    use autovenda_storage::SqliteStorage;
    use tokio::sync::Mutex;

    use super::HookContext;

    /// Records checkout requests; fails when `fail` is set.
    pub struct RecordingGateway {
        pub requests: Mutex<Vec<CheckoutRequest>>,
        pub fail: bool,
    }

    #[async_trait]
    impl PluginAdapter for RecordingGateway {
        fn name(&self) -> &str {
            "recording"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Payment
        }
        async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), AutovendaError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_checkout(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, AutovendaError> {
            if self.fail {
                return Err(AutovendaError::Payment {
                    message: "provider down".into(),
                    source: None,
                });
            }
            self.requests.lock().await.push(request.clone());
            Ok(CheckoutSession {
                id: Some("cs_test_1".into()),
                url: format!("https://checkout.test/{}", request.plan_slug),
            })
        }

        fn parse_webhook(
            &self,
            _payload: &[u8],
            _signature: Option<&str>,
        ) -> Result<PaymentEvent, AutovendaError> {
            Err(AutovendaError::WebhookValidation("not used".into()))
        }
    }

    pub struct Fixture {
        pub ctx: HookContext,
        pub gateway: Arc<RecordingGateway>,
        _dir: tempfile::TempDir,
    }

    pub async fn fixture(fail_checkout: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("hooks.db").to_string_lossy().into_owned(),
            wal_mode: false,
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let gateway = Arc::new(RecordingGateway {
            requests: Mutex::new(Vec::new()),
            fail: fail_checkout,
        });
        let prices = BTreeMap::from([
            ("flash".to_string(), "price_flash".to_string()),
            ("secretaria_virtual".to_string(), "price_sv".to_string()),
        ]);
        let broker = PaymentSessionBroker::new(
            gateway.clone(),
            SubscriptionGate::new(storage.clone()),
            prices,
        );

        Fixture {
            ctx: HookContext {
                storage,
                broker: Arc::new(broker),
                persona: "Sofia".into(),
            },
            gateway,
            _dir: dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn hook_tags_are_snake_case() {
        assert_eq!(Hook::from_str("lead_qualify").unwrap(), Hook::LeadQualify);
        assert_eq!(Hook::BrandGuard.to_string(), "brand_guard");
        assert!(Hook::from_str("LeadQualify").is_err());
    }

    #[test]
    fn combined_uses_last_six_entries() {
        let history: Vec<_> = (0..8)
            .map(|i| HistoryEntry::new(Role::User, format!("m{i}")))
            .collect();
        let input = HookInput::new("u1", "agora", &history);
        assert_eq!(input.tail().len(), 6);
        assert_eq!(input.combined(), "agora\nm2\nm3\nm4\nm5\nm6\nm7");
    }

    #[test]
    fn user_combined_skips_assistant_replies() {
        let history = vec![
            HistoryEntry::new(Role::User, "meu site é loja.com"),
            HistoryEntry::new(Role::Assistant, "pague em https://checkout.test/1"),
        ];
        let input = HookInput::new("u1", "oi", &history);
        assert_eq!(input.user_combined(), "oi\nmeu site é loja.com");
        assert!(input.combined().contains("checkout.test"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(HookOutcome::missing(&["name", "email"])).unwrap();
        assert_eq!(json["status"], "missing");
        assert_eq!(json["data"][1], "email");
    }
}
