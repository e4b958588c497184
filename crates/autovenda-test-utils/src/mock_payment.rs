// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment gateway.
//!
//! Checkout URLs are deterministic (`https://checkout.test/<user>/<plan>`).
//! Webhook bodies are [`PaymentEvent`] JSON; the signature `"invalid"` is
//! rejected so tests can exercise the validation path.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use autovenda_core::traits::adapter::PluginAdapter;
use autovenda_core::traits::payment::PaymentGateway;
use autovenda_core::types::{
    AdapterType, CheckoutRequest, CheckoutSession, HealthStatus, PaymentEvent, CHECKOUT_COMPLETED,
};
use autovenda_core::AutovendaError;

pub const INVALID_SIGNATURE: &str = "invalid";

#[derive(Default)]
pub struct MockPaymentGateway {
    requests: Mutex<Vec<CheckoutRequest>>,
    failing: AtomicBool,
    sessions: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make checkout creation fail with a payment error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn checkout_url(user_id: &str, plan_slug: &str) -> String {
        format!("https://checkout.test/{user_id}/{plan_slug}")
    }
}

/// A paid `checkout.session.completed` event for `user_id`.
pub fn completed_event(user_id: &str) -> PaymentEvent {
    PaymentEvent {
        event_type: CHECKOUT_COMPLETED.to_string(),
        reference_id: Some(user_id.to_string()),
        payment_status: Some("paid".to_string()),
        session_id: Some(format!("cs_test_{user_id}")),
        customer_id: Some(format!("cus_{user_id}")),
        subscription_id: Some(format!("sub_{user_id}")),
    }
}

#[async_trait]
impl PluginAdapter for MockPaymentGateway {
    fn name(&self) -> &str {
        "mock-payment"
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
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AutovendaError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AutovendaError::Payment {
                message: "mock checkout failure".into(),
                source: None,
            });
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CheckoutSession {
            id: Some(format!("cs_mock_{n}")),
            url: Self::checkout_url(&request.user_id, &request.plan_slug),
        })
    }

    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PaymentEvent, AutovendaError> {
        if signature == Some(INVALID_SIGNATURE) {
            return Err(AutovendaError::WebhookValidation(
                "signature mismatch".into(),
            ));
        }
        serde_json::from_slice(payload)
            .map_err(|e| AutovendaError::WebhookValidation(format!("malformed payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            user_id: "42".into(),
            plan_slug: "flash".into(),
            price_ref: "price_flash".into(),
            customer_email: None,
        }
    }

    #[tokio::test]
    async fn checkout_urls_are_deterministic() {
        let gateway = MockPaymentGateway::new();
        let session = gateway.create_checkout(&request()).await.unwrap();
        assert_eq!(session.url, "https://checkout.test/42/flash");
        assert_eq!(session.id.as_deref(), Some("cs_mock_1"));
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn failing_checkout_still_records_request() {
        let gateway = MockPaymentGateway::new();
        gateway.set_failing(true);
        assert!(gateway.create_checkout(&request()).await.is_err());
        assert_eq!(gateway.requests().len(), 1);
    }

    #[test]
    fn webhook_parsing() {
        let gateway = MockPaymentGateway::new();
        let body = serde_json::to_vec(&completed_event("42")).unwrap();
        let event = gateway.parse_webhook(&body, None).unwrap();
        assert_eq!(event.reference_id.as_deref(), Some("42"));

        assert!(matches!(
            gateway.parse_webhook(&body, Some(INVALID_SIGNATURE)),
            Err(AutovendaError::WebhookValidation(_))
        ));
        assert!(gateway.parse_webhook(b"not json", None).is_err());
    }
}
