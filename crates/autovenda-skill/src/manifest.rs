// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Skill definition parsing from `skill.toml`.
//!
//! A definition binds trigger keywords and a prompt fragment to an optional
//! extraction hook. Definitions are loaded once at startup.

use std::path::Path;
use std::str::FromStr;

use autovenda_core::AutovendaError;
use serde::Deserialize;

use crate::hooks::Hook;

/// A loaded, validated skill definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillDefinition {
    pub name: String,
    pub title: String,
    /// Lowercased trigger keywords.
    pub triggers: Vec<String>,
    /// Prompt fragment appended to the system prompt when the skill matches.
    pub prompt: String,
    pub hook: Option<Hook>,
    /// Informational: the skill's hook requires an active subscription.
    pub gated: bool,
}

// --- TOML intermediate structs ---

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    skill: SkillSection,
    #[serde(default)]
    prompt: PromptSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkillSection {
    name: String,
    #[serde(default)]
    title: Option<String>,
    triggers: Vec<String>,
    #[serde(default)]
    hook: Option<String>,
    #[serde(default)]
    gated: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptSection {
    #[serde(default)]
    body: String,
}

/// Parses a skill definition. `origin` names the source in errors.
pub fn parse_manifest(toml_content: &str, origin: &str) -> Result<SkillDefinition, AutovendaError> {
    let invalid = |message: String| AutovendaError::RegistryLoad {
        path: origin.to_string(),
        message,
    };

    let file: ManifestFile =
        toml::from_str(toml_content).map_err(|e| invalid(format!("invalid TOML: {e}")))?;
    let skill = file.skill;

    if skill.name.is_empty() {
        return Err(invalid("skill name must not be empty".to_string()));
    }
    if !skill
        .name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(invalid(format!(
            "skill name '{}' contains invalid characters (only a-z, 0-9, hyphens, underscores allowed)",
            skill.name
        )));
    }

    let triggers: Vec<String> = skill
        .triggers
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if triggers.is_empty() {
        return Err(invalid(format!("skill '{}' has no triggers", skill.name)));
    }

    let hook = skill
        .hook
        .as_deref()
        .map(|h| Hook::from_str(h).map_err(|_| invalid(format!("unknown hook '{h}'"))))
        .transpose()?;

    Ok(SkillDefinition {
        title: skill.title.unwrap_or_else(|| skill.name.clone()),
        name: skill.name,
        triggers,
        prompt: file.prompt.body.trim().to_string(),
        hook,
        gated: skill.gated,
    })
}

/// Loads and parses a skill definition from a file path.
pub fn load_manifest(path: &Path) -> Result<SkillDefinition, AutovendaError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| AutovendaError::RegistryLoad {
        path: origin.clone(),
        message: format!("failed to read: {e}"),
    })?;
    parse_manifest(&content, &origin)
}
