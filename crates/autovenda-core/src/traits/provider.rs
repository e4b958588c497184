// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the LLM client.

use async_trait::async_trait;

use crate::error::AutovendaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerateRequest;

/// Black-box text generation: a prompt and history in, plain text out.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Generates a reply for `request.user_text` given the system prompt and history.
    async fn generate(&self, request: GenerateRequest) -> Result<String, AutovendaError>;
}
