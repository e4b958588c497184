// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment session broker.
//!
//! Opens checkout sessions for catalog plans and reconciles provider
//! callbacks into subscription transitions. Reconciliation is idempotent:
//! only an update that actually moved a row fires the unlock notice.

use std::collections::BTreeMap;
use std::sync::Arc;

use autovenda_core::plans;
use autovenda_core::types::{
    CheckoutRequest, CheckoutSession, PaymentEvent, TransitionOutcome, CHECKOUT_COMPLETED,
};
use autovenda_core::{AutovendaError, PaymentGateway};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::gate::SubscriptionGate;

/// Payment statuses that confirm a completed checkout.
const CONFIRMED_STATUSES: &[&str] = &["paid", "no_payment_required"];

/// Sent once per `pending_payment -> active` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationNotice {
    pub user_id: String,
}

pub struct PaymentSessionBroker {
    gateway: Arc<dyn PaymentGateway>,
    gate: SubscriptionGate,
    prices: BTreeMap<String, String>,
    notices: Option<mpsc::Sender<ActivationNotice>>,
}

impl PaymentSessionBroker {
    /// `prices` maps plan slugs to provider price references.
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        gate: SubscriptionGate,
        prices: BTreeMap<String, String>,
    ) -> Self {
        Self {
            gateway,
            gate,
            prices,
            notices: None,
        }
    }

    /// Deliver an [`ActivationNotice`] on `tx` for every activation.
    pub fn with_notices(mut self, tx: mpsc::Sender<ActivationNotice>) -> Self {
        self.notices = Some(tx);
        self
    }

    pub fn gate(&self) -> &SubscriptionGate {
        &self.gate
    }

    pub fn gateway(&self) -> &Arc<dyn PaymentGateway> {
        &self.gateway
    }

    /// Open a checkout for `plan_slug` and move the user to `pending_payment`.
    ///
    /// The subscription row is written only after the provider returned a
    /// session, so a failed call never leaves a plan without a checkout.
    /// Active subscribers get [`AutovendaError::AlreadySubscribed`] and no
    /// provider call.
    pub async fn create_session(
        &self,
        user_id: &str,
        plan_slug: &str,
        customer_email: Option<&str>,
    ) -> Result<CheckoutSession, AutovendaError> {
        let unknown = || AutovendaError::UnknownPlan {
            plan: plan_slug.to_string(),
        };
        let plan = plans::find(plan_slug).ok_or_else(unknown)?;
        let price_ref = self.prices.get(plan.slug).ok_or_else(unknown)?;
        if self.gate.is_active(user_id).await? {
            return Err(AutovendaError::AlreadySubscribed {
                user_id: user_id.to_string(),
            });
        }

        let request = CheckoutRequest {
            user_id: user_id.to_string(),
            plan_slug: plan.slug.to_string(),
            price_ref: price_ref.clone(),
            customer_email: customer_email.map(str::to_string),
        };
        let session = self.gateway.create_checkout(&request).await?;

        if !self.gate.begin_checkout(user_id, plan).await? {
            info!(user_id, plan = plan.slug, "subscription already active; plan left unchanged");
        }
        Ok(session)
    }

    /// Verify and decode a raw provider callback, then reconcile it.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<TransitionOutcome, AutovendaError> {
        let event = self.gateway.parse_webhook(payload, signature)?;
        self.reconcile(&event).await
    }

    /// Apply one payment event to subscription state.
    pub async fn reconcile(&self, event: &PaymentEvent) -> Result<TransitionOutcome, AutovendaError> {
        let outcome = match validate(event) {
            Err(reason) => TransitionOutcome::Rejected(reason),
            Ok((user_id, provider_ref)) => {
                self.gate
                    .activate(user_id, provider_ref, event.customer_id.as_deref())
                    .await?
            }
        };

        let user_id = event.reference_id.as_deref().unwrap_or("-");
        match &outcome {
            TransitionOutcome::Activated => {
                info!(user_id, "subscription activated");
                self.notify(user_id).await;
            }
            TransitionOutcome::AlreadyActive => {
                info!(user_id, "duplicate payment event ignored");
            }
            TransitionOutcome::UserNotFound => {
                warn!(user_id, "payment event for unknown user rejected");
            }
            TransitionOutcome::Rejected(reason) => {
                warn!(user_id, event_type = %event.event_type, reason = %reason, "payment event rejected");
            }
        }
        Ok(outcome)
    }

    async fn notify(&self, user_id: &str) {
        let Some(tx) = &self.notices else { return };
        let notice = ActivationNotice {
            user_id: user_id.to_string(),
        };
        if tx.send(notice).await.is_err() {
            warn!(user_id, "activation notice dropped: receiver closed");
        }
    }
}

/// Returns `(user_id, provider_ref)` for an event that may activate a row.
fn validate(event: &PaymentEvent) -> Result<(&str, &str), String> {
    if event.event_type != CHECKOUT_COMPLETED {
        return Err(format!("unsupported event type {}", event.event_type));
    }
    let user_id = event
        .reference_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| "missing client_reference_id".to_string())?;
    match event.payment_status.as_deref() {
        Some(status) if CONFIRMED_STATUSES.contains(&status) => {}
        other => {
            return Err(format!(
                "payment not confirmed (status {})",
                other.unwrap_or("absent")
            ));
        }
    }
    let provider_ref = event
        .subscription_id
        .as_deref()
        .or(event.session_id.as_deref())
        .ok_or_else(|| "missing provider reference".to_string())?;
    Ok((user_id, provider_ref))
}
