// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./autovenda.toml` > `~/.config/autovenda/autovenda.toml`
//! > `/etc/autovenda/autovenda.toml` with environment variable overrides via
//! the `AUTOVENDA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::AutovendaConfig;

/// Config sections addressable from environment variables.
const ENV_SECTIONS: &[&str] = &[
    "agent", "telegram", "gemini", "storage", "skills", "stripe", "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/autovenda/autovenda.toml` (system-wide)
/// 3. `~/.config/autovenda/autovenda.toml` (user XDG config)
/// 4. `./autovenda.toml` (local directory)
/// 5. `AUTOVENDA_*` environment variables
pub fn load_config() -> Result<AutovendaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AutovendaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AutovendaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AutovendaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AutovendaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AutovendaConfig::default()))
        .merge(Toml::file("/etc/autovenda/autovenda.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("autovenda/autovenda.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("autovenda.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `AUTOVENDA_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token` and
/// `AUTOVENDA_STRIPE_WEBHOOK_SECRET` to `stripe.webhook_secret`.
fn env_provider() -> Env {
    Env::prefixed("AUTOVENDA_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}
