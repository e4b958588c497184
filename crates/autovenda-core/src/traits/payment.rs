// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment gateway trait for hosted checkout providers.

use async_trait::async_trait;

use crate::error::AutovendaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CheckoutRequest, CheckoutSession, PaymentEvent};

/// Creates checkout sessions and authenticates provider callbacks.
///
/// Signature verification lives here; the engine only sees verified
/// [`PaymentEvent`]s.
#[async_trait]
pub trait PaymentGateway: PluginAdapter {
    /// Creates a hosted checkout session and returns its URL.
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AutovendaError>;

    /// Verifies a raw webhook body and decodes it into a [`PaymentEvent`].
    ///
    /// Fails with [`AutovendaError::WebhookValidation`] when the payload is
    /// malformed or the signature does not match.
    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PaymentEvent, AutovendaError>;
}
