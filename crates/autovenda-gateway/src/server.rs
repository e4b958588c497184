// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use autovenda_billing::PaymentSessionBroker;
use autovenda_config::model::GatewayConfig;
use autovenda_core::{AutovendaError, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Provider webhooks are small JSON documents.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub broker: Arc<PaymentSessionBroker>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Persona name reported by `GET /`.
    pub persona: String,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        broker: Arc<PaymentSessionBroker>,
        storage: Arc<dyn StorageAdapter>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            storage,
            persona: persona.into(),
            start_time: Instant::now(),
        }
    }
}

/// All gateway routes:
/// - GET /
/// - GET /health
/// - POST /webhook/stripe
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::get_root))
        .route("/health", get(handlers::get_health))
        .route("/webhook/stripe", post(handlers::post_stripe_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

/// Serve the gateway until `cancel` fires.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), AutovendaError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AutovendaError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| AutovendaError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("gateway stopped");
    Ok(())
}
