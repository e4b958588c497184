// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapter traits and the conversation engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a delivered outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
    Payment,
}

// --- Conversation history ---

/// Author of a history entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A `(role, content)` pair as replayed into prompts and hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A persisted message row.
///
/// `id` is the store-assigned sequence number; it totally orders one
/// user's messages even when two share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl From<StoredMessage> for HistoryEntry {
    fn from(msg: StoredMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
        }
    }
}

// --- Users and subscriptions ---

/// A lead or customer, keyed by the origin-channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub contact_handle: Option<String>,
    pub created_at: String,
}

/// Lifecycle state of a user's subscription.
///
/// Ordering follows the forward direction of the lifecycle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Lead,
    PendingPayment,
    Active,
}

impl SubscriptionStatus {
    /// Whether a non-administrative transition from `self` to `next` is allowed.
    ///
    /// Staying in place is allowed so repeated checkouts can replace the plan.
    pub fn can_advance_to(self, next: SubscriptionStatus) -> bool {
        match (self, next) {
            (Self::Active, _) => next == Self::Active,
            (from, to) => to >= from,
        }
    }
}

/// One subscription row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    pub plan: Option<String>,
    pub monthly_price: Option<f64>,
    pub status: SubscriptionStatus,
    pub provider_customer_id: Option<String>,
    pub provider_subscription_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Result of the conditional `pending_payment -> active` update at the store level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationResult {
    /// Exactly one row moved to `active`.
    Activated,
    /// The row was already `active`; nothing changed.
    AlreadyActive,
    /// The row exists but is not awaiting payment.
    NotPending(SubscriptionStatus),
    /// No row for that user.
    NotFound,
}

// --- Onboarding ---

/// Configuration progress of an onboarded customer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationStatus {
    Pendente,
    Completo,
}

/// Onboarding data collected after activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub user_id: String,
    pub contact_channel: Option<String>,
    pub site_url: Option<String>,
    pub objectives: Option<String>,
    pub collected_at: Option<String>,
    pub configuration_status: ConfigurationStatus,
}

/// A partial onboarding write. `None` fields never overwrite stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingUpdate {
    pub contact_channel: Option<String>,
    pub site_url: Option<String>,
    pub objectives: Option<String>,
    pub configuration_status: Option<ConfigurationStatus>,
}

// --- Payments ---

/// Provider event type that confirms a completed checkout.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A payment-provider callback, reduced to the fields reconciliation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event_type: String,
    /// Client-supplied reference; equals the user id.
    pub reference_id: Option<String>,
    pub payment_status: Option<String>,
    pub session_id: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

/// Outcome of reconciling one payment event against subscription state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Activated,
    AlreadyActive,
    UserNotFound,
    Rejected(String),
}

/// A request to open a hosted checkout for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub plan_slug: String,
    pub price_ref: String,
    pub customer_email: Option<String>,
}

/// A checkout session created by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: Option<String>,
    pub url: String,
}

// --- Channel types ---

/// An inbound message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-specific message id.
    pub id: String,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Origin-channel user identifier; used as the user id.
    pub sender_id: String,
    pub text: String,
    /// ISO 8601 timestamp.
    pub timestamp: String,
    pub display_name: Option<String>,
    pub contact_handle: Option<String>,
    /// Channel-specific routing data (JSON).
    pub metadata: Option<String>,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel: String,
    pub recipient_id: String,
    pub content: String,
    pub metadata: Option<String>,
}

/// Capabilities reported by a channel adapter.
#[derive(Debug, Clone)]
pub struct ChannelCapabilities {
    pub supports_typing: bool,
    pub max_message_length: Option<usize>,
}

// --- Provider types ---

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub system_prompt: String,
    /// Oldest-first conversation window, excluding `user_text`.
    pub history: Vec<HistoryEntry>,
    pub user_text: String,
}
