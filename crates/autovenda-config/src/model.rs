// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Auto-Venda sales agent.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AutovendaConfig {
    /// Persona and conversation behavior.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Gemini LLM settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Skill definition source.
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Stripe checkout and webhook settings.
    #[serde(default)]
    pub stripe: StripeConfig,

    /// HTTP gateway (webhook receiver and health) settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Persona and conversation behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Persona name used in prompts and canned replies.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Company the persona represents.
    #[serde(default = "default_company")]
    pub company: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base system prompt. When unset a persona prompt is built from `name` and `company`.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Number of history entries replayed into each turn.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Reply to the `/start` command.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Generic apology shown when a turn fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            company: default_company(),
            log_level: default_log_level(),
            system_prompt: None,
            history_window: default_history_window(),
            greeting: default_greeting(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

fn default_agent_name() -> String {
    "Sofia".to_string()
}

fn default_company() -> String {
    "Agência Auto-Venda".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_window() -> usize {
    10
}

fn default_greeting() -> String {
    "Olá! Sou a Sofia. Estou online e pronta para ajudar!".to_string()
}

fn default_fallback_reply() -> String {
    "Tive um problema técnico. Tente novamente.".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables Telegram integration.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user IDs or usernames allowed to talk to the bot.
    /// Empty means everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every turn.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API base URL.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("autovenda").join("autovenda.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("autovenda.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Skill definition source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SkillsConfig {
    /// Directory holding one `<skill>/skill.toml` per skill.
    #[serde(default = "default_skills_directory")]
    pub directory: String,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            directory: default_skills_directory(),
        }
    }
}

fn default_skills_directory() -> String {
    "skills".to_string()
}

/// Stripe checkout and webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StripeConfig {
    /// Secret API key. `None` disables checkout creation.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Webhook signing secret. `None` accepts unsigned events.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Redirect after a successful payment.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    /// Redirect after an abandoned checkout.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,

    /// ISO currency code for all plans.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Plan slug to provider price reference.
    #[serde(default)]
    pub prices: BTreeMap<String, String>,

    /// API base URL.
    #[serde(default = "default_stripe_base_url")]
    pub api_base: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            currency: default_currency(),
            prices: BTreeMap::new(),
            api_base: default_stripe_base_url(),
        }
    }
}

fn default_success_url() -> String {
    "https://autovenda.example/sucesso".to_string()
}

fn default_cancel_url() -> String {
    "https://autovenda.example/cancelado".to_string()
}

fn default_currency() -> String {
    "brl".to_string()
}

fn default_stripe_base_url() -> String {
    "https://api.stripe.com".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Start the HTTP gateway alongside the bot.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_sales_bot() {
        let config = AutovendaConfig::default();
        assert_eq!(config.agent.name, "Sofia");
        assert_eq!(config.agent.history_window, 10);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.max_output_tokens, 1000);
        assert_eq!(config.stripe.currency, "brl");
        assert!(config.stripe.prices.is_empty());
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.skills.directory, "skills");
    }

    #[test]
    fn default_database_path_ends_with_db_file() {
        let config = StorageConfig::default();
        assert!(config.database_path.ends_with("autovenda.db"));
        assert!(config.wal_mode);
    }
}
