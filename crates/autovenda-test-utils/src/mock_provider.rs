// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! Responses are popped from a FIFO queue; an empty queue yields
//! `"mock response"`. Every request is captured for assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use autovenda_core::traits::adapter::PluginAdapter;
use autovenda_core::traits::provider::ProviderAdapter;
use autovenda_core::types::{AdapterType, GenerateRequest, HealthStatus};
use autovenda_core::AutovendaError;

pub const DEFAULT_RESPONSE: &str = "mock response";

pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    failing: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Make every following call fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All requests received so far.
    pub async fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AutovendaError> {
        self.requests.lock().await.push(request);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AutovendaError::Provider {
                message: "mock provider failure".into(),
                source: None,
            });
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> GenerateRequest {
        GenerateRequest {
            system_prompt: "sys".into(),
            history: vec![],
            user_text: text.into(),
        }
    }

    #[tokio::test]
    async fn queued_responses_then_default() {
        let provider = MockProvider::with_responses(vec!["first".into()]);
        assert_eq!(provider.generate(request("a")).await.unwrap(), "first");
        assert_eq!(provider.generate(request("b")).await.unwrap(), DEFAULT_RESPONSE);
        assert_eq!(provider.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn failing_mode_returns_provider_error() {
        let provider = MockProvider::new();
        provider.set_failing(true);
        let err = provider.generate(request("a")).await.unwrap_err();
        assert!(matches!(err, AutovendaError::Provider { .. }));
    }
}
