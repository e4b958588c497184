// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Auto-Venda sales agent.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`), an
//! XDG file hierarchy, `AUTOVENDA_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use autovenda_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Persona: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::PathBuf;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::AutovendaConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors are converted to diagnostics pointing into whichever
/// `autovenda.toml` produced them.
pub fn load_and_validate() -> Result<AutovendaConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(persona = %config.agent.name, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<AutovendaConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Candidate config files, lowest precedence first.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/autovenda/autovenda.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("autovenda/autovenda.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("autovenda.toml"));
    }
    paths
}

/// Read every existing config file for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    config_paths()
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
