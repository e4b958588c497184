// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistent store.

use async_trait::async_trait;

use crate::error::AutovendaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ActivationResult, OnboardingRecord, OnboardingUpdate, Role, StoredMessage, Subscription,
    UserProfile,
};

/// Adapter for the relational store behind history, subscriptions and onboarding.
///
/// Every write is a single-row unit of atomicity; writes for different
/// users never block each other beyond the store's own serialization.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (open, migrate).
    async fn initialize(&self) -> Result<(), AutovendaError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), AutovendaError>;

    // --- History ---

    /// Appends one message and returns its sequence id.
    async fn append_message(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
    ) -> Result<i64, AutovendaError>;

    /// Returns the newest `limit` messages for a user, oldest first.
    async fn recent_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, AutovendaError>;

    // --- Users ---

    /// Creates the user row if missing; fills empty contact fields otherwise.
    async fn upsert_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        contact_handle: Option<&str>,
    ) -> Result<(), AutovendaError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AutovendaError>;

    /// Overwrites the display name with one extracted from conversation.
    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<(), AutovendaError>;

    // --- Subscriptions ---

    async fn get_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, AutovendaError>;

    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AutovendaError>;

    /// Records plan interest: inserts a `lead` row, or updates the plan of a
    /// row that is still `lead`. Returns the number of rows written.
    async fn record_plan_interest(
        &self,
        user_id: &str,
        plan: &str,
        monthly_price: f64,
    ) -> Result<usize, AutovendaError>;

    /// Moves a `lead`/`pending_payment` row (or a missing one) to
    /// `pending_payment` with the given plan. Never touches `active` rows.
    async fn mark_pending_payment(
        &self,
        user_id: &str,
        plan: &str,
        monthly_price: f64,
    ) -> Result<usize, AutovendaError>;

    /// Conditionally moves `pending_payment -> active` inside one transaction.
    async fn activate_subscription(
        &self,
        user_id: &str,
        provider_subscription_id: &str,
        provider_customer_id: Option<&str>,
    ) -> Result<ActivationResult, AutovendaError>;

    /// Administrative reset back to `lead`, clearing provider references.
    async fn reset_subscription(&self, user_id: &str) -> Result<usize, AutovendaError>;

    // --- Onboarding ---

    async fn get_onboarding(
        &self,
        user_id: &str,
    ) -> Result<Option<OnboardingRecord>, AutovendaError>;

    /// Upserts by user id; `None` fields keep their stored values.
    async fn upsert_onboarding(
        &self,
        user_id: &str,
        update: &OnboardingUpdate,
    ) -> Result<(), AutovendaError>;
}
