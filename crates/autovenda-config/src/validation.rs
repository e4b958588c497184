// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as ranges, non-empty paths, and price-map keys matching the plan catalog.

use autovenda_core::plans;

use crate::diagnostic::ConfigError;
use crate::model::AutovendaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AutovendaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(validation("agent.name must not be empty".to_string()));
    }

    if !(1..=100).contains(&config.agent.history_window) {
        errors.push(validation(format!(
            "agent.history_window must be between 1 and 100, got {}",
            config.agent.history_window
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(validation(
            "storage.database_path must not be empty".to_string(),
        ));
    }

    if config.skills.directory.trim().is_empty() {
        errors.push(validation("skills.directory must not be empty".to_string()));
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        errors.push(validation(format!(
            "gemini.temperature must be between 0.0 and 2.0, got {}",
            config.gemini.temperature
        )));
    }

    if config.gemini.timeout_secs == 0 {
        errors.push(validation(
            "gemini.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.gateway.enabled {
        if config.gateway.port == 0 {
            errors.push(validation("gateway.port must not be 0".to_string()));
        }
        let host = config.gateway.host.trim();
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(validation(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    for (key, url) in [
        ("stripe.success_url", &config.stripe.success_url),
        ("stripe.cancel_url", &config.stripe.cancel_url),
    ] {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            errors.push(validation(format!(
                "{key} must be an http(s) URL, got `{url}`"
            )));
        }
    }

    for (slug, price_ref) in &config.stripe.prices {
        if plans::find(slug).is_none() {
            let known: Vec<&str> = plans::CATALOG.iter().map(|p| p.slug).collect();
            errors.push(validation(format!(
                "stripe.prices has unknown plan `{slug}` (known plans: {})",
                known.join(", ")
            )));
        }
        if price_ref.trim().is_empty() {
            errors.push(validation(format!(
                "stripe.prices.{slug} must not be empty"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validation(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = AutovendaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = AutovendaConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn history_window_out_of_range_fails() {
        let mut config = AutovendaConfig::default();
        config.agent.history_window = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "history_window"));
    }

    #[test]
    fn unknown_price_slug_fails() {
        let mut config = AutovendaConfig::default();
        config
            .stripe
            .prices
            .insert("platinum".to_string(), "price_123".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "unknown plan `platinum`"));
    }

    #[test]
    fn known_price_slugs_validate() {
        let mut config = AutovendaConfig::default();
        config
            .stripe
            .prices
            .insert("flash".to_string(), "price_flash".to_string());
        config
            .stripe
            .prices
            .insert("ecossistema_completo".to_string(), "price_eco".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = AutovendaConfig::default();
        config.gateway.port = 0;
        config.gemini.temperature = 3.5;
        config.stripe.success_url = "ftp://nope".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn disabled_gateway_skips_port_check() {
        let mut config = AutovendaConfig::default();
        config.gateway.enabled = false;
        config.gateway.port = 0;
        assert!(validate_config(&config).is_ok());
    }
}
