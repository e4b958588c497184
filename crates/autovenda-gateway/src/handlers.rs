// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use autovenda_core::types::TransitionOutcome;
use autovenda_core::{AutovendaError, HealthStatus};
use serde::Serialize;
use tracing::{error, warn};

use crate::server::GatewayState;

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub bot: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /
pub async fn get_root(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        bot: state.persona.clone(),
    })
}

/// GET /health
///
/// 503 when the store is unhealthy or unreachable.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.start_time.elapsed().as_secs();
    let (code, status, detail) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string())),
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            detail,
            uptime_secs,
        }),
    )
        .into_response()
}

/// POST /webhook/stripe
///
/// Every reconciled event answers 200 with its outcome, so the provider
/// does not retry rejected or duplicate events. Unverifiable payloads get
/// 400; store failures get 500 and are retried by the provider.
pub async fn post_stripe_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.broker.handle_webhook(&body, signature).await {
        Ok(outcome) => (StatusCode::OK, Json::<TransitionOutcome>(outcome)).into_response(),
        Err(AutovendaError::WebhookValidation(reason)) => {
            warn!(reason = %reason, "webhook rejected");
            error_response(StatusCode::BAD_REQUEST, reason)
        }
        Err(e) => {
            error!(error = %e, "webhook reconciliation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    }
}

fn error_response(code: StatusCode, error: String) -> Response {
    (code, Json(ErrorResponse { error })).into_response()
}
