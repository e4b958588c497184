// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Auto-Venda configuration system.

use autovenda_config::diagnostic::ConfigError;
use autovenda_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with every section deserializes successfully.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "Sofia"
company = "Agência Auto-Venda"
history_window = 6

[telegram]
bot_token = "123:ABC"
allowed_users = ["42"]

[gemini]
api_key = "g-key"
temperature = 0.4

[storage]
database_path = "/tmp/autovenda-test.db"
wal_mode = false

[skills]
directory = "/opt/skills"

[stripe]
secret_key = "sk_test_1"
webhook_secret = "whsec_1"

[stripe.prices]
flash = "price_flash"
secretaria_virtual = "price_sv"

[gateway]
port = 9000
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.agent.history_window, 6);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_users, vec!["42"]);
    assert_eq!(config.gemini.temperature, 0.4);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.skills.directory, "/opt/skills");
    assert_eq!(config.stripe.prices.get("flash").map(String::as_str), Some("price_flash"));
    assert_eq!(config.gateway.port, 9000);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.agent.name, "Sofia");
    assert!(config.stripe.secret_key.is_none());
}

#[test]
fn unknown_key_is_reported_with_suggestion() {
    let toml = "[stripe]\nwebhok_secret = \"x\"\n";
    let errors = load_and_validate_str(toml).expect_err("typo must be rejected");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "webhok_secret" && s == "webhook_secret"
        )
    });
    assert!(found, "expected suggestion, got {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[anthropic]\napi_key = \"x\"\n").expect_err("unknown section");
    assert!(format!("{err}").contains("anthropic"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").expect_err("bad type");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

#[test]
fn price_map_must_name_catalog_plans() {
    let toml = "[stripe.prices]\nplatinum = \"price_x\"\n";
    let errors = load_and_validate_str(toml).expect_err("unknown plan slug");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("platinum"))));
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "autovenda.toml",
            "[gemini]\nmodel = \"gemini-1.5-pro\"\n[stripe]\nsecret_key = \"from_file\"\n",
        )?;
        jail.set_env("AUTOVENDA_STRIPE_SECRET_KEY", "from_env");
        jail.set_env("AUTOVENDA_TELEGRAM_BOT_TOKEN", "1:TOKEN");

        let config = load_config_from_path(std::path::Path::new("autovenda.toml"))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.stripe.secret_key.as_deref(), Some("from_env"));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("1:TOKEN"));
        Ok(())
    });
}

#[test]
fn env_keys_split_on_section_regardless_of_case() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("autovenda.toml", "")?;
        jail.set_env("AUTOVENDA_AGENT_HISTORY_WINDOW", "4");
        jail.set_env("AUTOVENDA_GATEWAY_PORT", "9100");
        jail.set_env("AUTOVENDA_STRIPE_WEBHOOK_SECRET", "whsec_env");

        let config = load_config_from_path(std::path::Path::new("autovenda.toml"))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.agent.history_window, 4);
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.stripe.webhook_secret.as_deref(), Some("whsec_env"));
        Ok(())
    });
}
