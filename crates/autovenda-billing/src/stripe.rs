// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal Stripe Checkout client built on reqwest.
//!
//! Creates subscription-mode checkout sessions and decodes
//! `Stripe-Signature`-verified webhook events.

use std::time::Duration;

use async_trait::async_trait;
use autovenda_config::model::StripeConfig;
use autovenda_core::types::{CheckoutRequest, CheckoutSession, PaymentEvent};
use autovenda_core::{AdapterType, AutovendaError, HealthStatus, PaymentGateway, PluginAdapter};
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, error};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe Checkout gateway.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: Option<String>,
    webhook_secret: Option<String>,
    success_url: String,
    cancel_url: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutResp {
    id: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    type_: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Result<Self, AutovendaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AutovendaError::Payment {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, AutovendaError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            context,
            "stripe api request failed"
        );

        let message = details
            .and_then(|d| d.message)
            .unwrap_or_else(|| format!("status {status}"));
        Err(AutovendaError::Payment {
            message: format!("{context}: {message}"),
            source: None,
        })
    }

    /// Checks a `t=...,v1=...` header against the raw body and rejects
    /// timestamps more than [`SIGNATURE_TOLERANCE_SECS`] away from `now`.
    fn verify_signature(
        secret: &str,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> Result<(), AutovendaError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signatures.push(rest);
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            AutovendaError::WebhookValidation("missing timestamp in Stripe-Signature".into())
        })?;
        if signatures.is_empty() {
            return Err(AutovendaError::WebhookValidation(
                "missing v1 in Stripe-Signature".into(),
            ));
        }
        let signed_at: i64 = timestamp.parse().map_err(|_| {
            AutovendaError::WebhookValidation("malformed timestamp in Stripe-Signature".into())
        })?;
        if (now - signed_at).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(AutovendaError::WebhookValidation(
                "webhook timestamp outside tolerance".into(),
            ));
        }

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AutovendaError::WebhookValidation(format!("bad webhook secret: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let valid = signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|provided| mac.clone().verify_slice(&provided).is_ok())
                .unwrap_or(false)
        });
        if valid {
            Ok(())
        } else {
            Err(AutovendaError::WebhookValidation("invalid webhook signature".into()))
        }
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

fn string_field(object: &serde_json::Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl PluginAdapter for StripeGateway {
    fn name(&self) -> &str {
        "stripe"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Payment
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        Ok(match self.secret_key {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("stripe.secret_key is not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AutovendaError> {
        let secret_key = self.secret_key.as_deref().ok_or_else(|| AutovendaError::Payment {
            message: "stripe.secret_key is not configured".into(),
            source: None,
        })?;

        let mut body: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", request.price_ref.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("client_reference_id", request.user_id.clone()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("metadata[plan]", request.plan_slug.clone()),
        ];
        if let Some(email) = &request.customer_email {
            body.push(("customer_email", email.clone()));
        }

        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {secret_key}"))
            .form(&body)
            .send()
            .await
            .map_err(|e| AutovendaError::Payment {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        let parsed: CheckoutResp = resp.json().await.map_err(|e| AutovendaError::Payment {
            message: format!("failed to parse checkout session: {e}"),
            source: Some(Box::new(e)),
        })?;
        let url = parsed.url.ok_or_else(|| AutovendaError::Payment {
            message: "checkout session URL is missing".into(),
            source: None,
        })?;

        debug!(user_id = %request.user_id, plan = %request.plan_slug, "checkout session created");
        Ok(CheckoutSession { id: parsed.id, url })
    }

    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PaymentEvent, AutovendaError> {
        if let Some(secret) = &self.webhook_secret {
            let header = signature.ok_or_else(|| {
                AutovendaError::WebhookValidation("missing Stripe-Signature header".into())
            })?;
            Self::verify_signature(secret, payload, header, chrono::Utc::now().timestamp())?;
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| AutovendaError::WebhookValidation(format!("malformed event: {e}")))?;
        let object = &event.data.object;

        Ok(PaymentEvent {
            event_type: event.type_,
            reference_id: string_field(object, "client_reference_id"),
            payment_status: string_field(object, "payment_status"),
            session_id: string_field(object, "id"),
            customer_id: string_field(object, "customer"),
            subscription_id: string_field(object, "subscription"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(secret: Option<&str>) -> StripeConfig {
        StripeConfig {
            secret_key: Some("sk_test_123".into()),
            webhook_secret: secret.map(str::to_string),
            ..StripeConfig::default()
        }
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            user_id: "42".into(),
            plan_slug: "flash".into(),
            price_ref: "price_flash".into(),
            customer_email: Some("joao@example.com".into()),
        }
    }

    fn sign(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn now() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    const EVENT: &str = r#"{
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {"object": {
            "id": "cs_test_1",
            "client_reference_id": "42",
            "payment_status": "paid",
            "customer": "cus_1",
            "subscription": "sub_1"
        }}
    }"#;

    #[tokio::test]
    async fn create_checkout_posts_form_and_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("client_reference_id=42"))
            .and(body_string_contains("mode=subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = StripeGateway::new(&config(None)).unwrap().with_base_url(server.uri());
        let session = gateway.create_checkout(&request()).await.unwrap();
        assert_eq!(session.id.as_deref(), Some("cs_test_1"));
        assert!(session.url.contains("cs_test_1"));
    }

    #[tokio::test]
    async fn provider_error_is_payment_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "code": "resource_missing", "message": "No such price"}
            })))
            .mount(&server)
            .await;

        let gateway = StripeGateway::new(&config(None)).unwrap().with_base_url(server.uri());
        let err = gateway.create_checkout(&request()).await.unwrap_err();
        assert!(matches!(err, AutovendaError::Payment { .. }));
        assert!(err.to_string().contains("No such price"));
    }

    #[tokio::test]
    async fn missing_secret_key_fails_without_request() {
        let mut cfg = config(None);
        cfg.secret_key = None;
        let gateway = StripeGateway::new(&cfg).unwrap();
        assert!(gateway.create_checkout(&request()).await.is_err());
        assert!(matches!(
            gateway.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[test]
    fn signed_event_is_decoded() {
        let gateway = StripeGateway::new(&config(Some("whsec_test"))).unwrap();
        let signature = sign("whsec_test", &now(), EVENT.as_bytes());

        let event = gateway.parse_webhook(EVENT.as_bytes(), Some(&signature)).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.reference_id.as_deref(), Some("42"));
        assert_eq!(event.payment_status.as_deref(), Some("paid"));
        assert_eq!(event.subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(event.session_id.as_deref(), Some("cs_test_1"));
    }

    #[test]
    fn tampered_or_unsigned_event_is_rejected() {
        let gateway = StripeGateway::new(&config(Some("whsec_test"))).unwrap();
        let signature = sign("other_secret", &now(), EVENT.as_bytes());

        let err = gateway.parse_webhook(EVENT.as_bytes(), Some(&signature)).unwrap_err();
        assert!(matches!(err, AutovendaError::WebhookValidation(_)));
        assert!(gateway.parse_webhook(EVENT.as_bytes(), None).is_err());
    }

    #[test]
    fn stale_or_future_signature_is_rejected() {
        let signed_at = 1_700_000_000;
        let header = sign("whsec_test", &signed_at.to_string(), EVENT.as_bytes());
        let verify = |now| StripeGateway::verify_signature("whsec_test", EVENT.as_bytes(), &header, now);

        assert!(verify(signed_at + 60).is_ok());
        assert!(verify(signed_at - 60).is_ok());
        let err = verify(signed_at + SIGNATURE_TOLERANCE_SECS + 1).unwrap_err();
        assert!(err.to_string().contains("tolerance"));
        assert!(verify(signed_at - SIGNATURE_TOLERANCE_SECS - 1).is_err());

        let gateway = StripeGateway::new(&config(Some("whsec_test"))).unwrap();
        assert!(gateway.parse_webhook(EVENT.as_bytes(), Some(&header)).is_err());
    }

    #[test]
    fn unsigned_mode_still_rejects_garbage() {
        let gateway = StripeGateway::new(&config(None)).unwrap();
        assert!(gateway.parse_webhook(EVENT.as_bytes(), None).is_ok());
        let err = gateway.parse_webhook(b"not json", None).unwrap_err();
        assert!(matches!(err, AutovendaError::WebhookValidation(_)));
    }
}
