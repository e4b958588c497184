// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.

use autovenda_config::model::AgentConfig;
use autovenda_core::plans::{self, CATALOG};
use autovenda_skill::SkillDefinition;

/// The configured system prompt, or the default persona prompt.
pub fn base_system_prompt(config: &AgentConfig) -> String {
    if let Some(prompt) = config.system_prompt.as_deref().map(str::trim)
        && !prompt.is_empty()
    {
        return prompt.to_string();
    }

    let catalog = CATALOG
        .iter()
        .map(|plan| format!("{} ({}/mês)", plan.title, plans::format_brl(plan.price_cents)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Você é a {name}, consultora de automação da {company}. \
         Responda de forma concisa, educada e use emojis ocasionalmente. \
         Nossos planos: {catalog}. Nunca invente preços ou links de pagamento.",
        name = config.name,
        company = config.company,
    )
}

/// Base prompt plus the matched skill's fragment.
pub fn build_system_prompt(base: &str, skill: Option<&SkillDefinition>) -> String {
    match skill {
        Some(skill) if !skill.prompt.is_empty() => {
            format!("{base}\n\n## {}\n{}", skill.title, skill.prompt)
        }
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovenda_skill::parse_manifest;

    #[test]
    fn default_prompt_names_persona_and_catalog() {
        let prompt = base_system_prompt(&AgentConfig::default());
        assert!(prompt.starts_with("Você é a Sofia"));
        assert!(prompt.contains("Atendimento Flash (R$ 159,99/mês)"));
        assert!(prompt.contains("Ecossistema Completo (R$ 1.499,99/mês)"));
    }

    #[test]
    fn configured_prompt_wins() {
        let config = AgentConfig {
            system_prompt: Some("  Seja breve.  ".into()),
            ..AgentConfig::default()
        };
        assert_eq!(base_system_prompt(&config), "Seja breve.");
    }

    #[test]
    fn skill_fragment_is_appended() {
        let skill = parse_manifest(
            "[skill]\nname = \"p\"\ntitle = \"Propostas\"\ntriggers = [\"plano\"]\n[prompt]\nbody = \"Peça nome e e-mail.\"\n",
            "p",
        )
        .unwrap();
        assert_eq!(
            build_system_prompt("Base.", Some(&skill)),
            "Base.\n\n## Propostas\nPeça nome e e-mail."
        );
        assert_eq!(build_system_prompt("Base.", None), "Base.");
    }
}
