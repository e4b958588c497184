// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Auto-Venda sales agent.
//!
//! Implements [`ProviderAdapter`] over the non-streaming `generateContent`
//! endpoint. History roles map `assistant` to Gemini's `model`.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use autovenda_config::model::GeminiConfig;
use autovenda_core::error::AutovendaError;
use autovenda_core::traits::{PluginAdapter, ProviderAdapter};
use autovenda_core::types::{AdapterType, GenerateRequest, HealthStatus, Role};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig};

/// Environment variables consulted when the config has no key, in order.
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Gemini provider implementing [`ProviderAdapter`].
pub struct GeminiProvider {
    client: GeminiClient,
    generation: GenerationConfig,
}

impl GeminiProvider {
    /// API key resolution: `gemini.api_key`, then `GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`.
    pub fn new(config: &GeminiConfig) -> Result<Self, AutovendaError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(model = %config.model, "Gemini provider initialized");

        Ok(Self {
            client,
            generation: GenerationConfig {
                max_output_tokens: config.max_output_tokens,
                temperature: config.temperature,
            },
        })
    }

    fn to_request(&self, request: &GenerateRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .filter_map(|entry| {
                let role = match entry.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(Content::text(Some(role), entry.content.clone()))
            })
            .collect();
        contents.push(Content::text(Some("user"), request.user_text.clone()));

        let system_instruction = (!request.system_prompt.is_empty())
            .then(|| Content::text(None, request.system_prompt.clone()));

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: self.generation.clone(),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        // No probe call: it would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<String, AutovendaError> {
        let api_request = self.to_request(&request);
        let response = self.client.generate_content(&api_request).await?;

        if let Some(text) = response.text() {
            return Ok(text);
        }

        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| response.candidates.first().and_then(|c| c.finish_reason.clone()))
            .unwrap_or_else(|| "no candidates".to_string());
        warn!(model = %self.client.model(), reason = %reason, "Gemini returned no text");
        Err(AutovendaError::Provider {
            message: format!("empty response from Gemini: {reason}"),
            source: None,
        })
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, AutovendaError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    API_KEY_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| {
            AutovendaError::Config(
                "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
            )
        })
}
