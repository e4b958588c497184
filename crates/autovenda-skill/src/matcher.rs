// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword scoring of user text against registered skills.

use autovenda_core::types::HistoryEntry;

use crate::manifest::SkillDefinition;
use crate::registry::SkillRegistry;

/// Number of distinct triggers of `skill` contained in `text_lower`.
pub fn score(skill: &SkillDefinition, text_lower: &str) -> usize {
    skill
        .triggers
        .iter()
        .filter(|trigger| text_lower.contains(trigger.as_str()))
        .count()
}

/// Selects at most one skill for this turn.
///
/// The strictly highest positive score wins; a tie or no hits selects
/// nothing. `_recent_history` is never scored so stale intents do not
/// re-trigger; hooks see history instead.
pub fn match_skill<'a>(
    registry: &'a SkillRegistry,
    user_text: &str,
    _recent_history: &[HistoryEntry],
) -> Option<&'a SkillDefinition> {
    let text = user_text.to_lowercase();
    let mut best: Option<&SkillDefinition> = None;
    let mut best_score = 0;
    let mut tied = false;

    for skill in registry.iter() {
        let s = score(skill, &text);
        if s == 0 {
            continue;
        }
        if s > best_score {
            best = Some(skill);
            best_score = s;
            tied = false;
        } else if s == best_score {
            tied = true;
        }
    }

    if tied { None } else { best }
}
