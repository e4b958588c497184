// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: `skills`, `leads`, `history` and `subscription reset`.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use autovenda_billing::SubscriptionGate;
use autovenda_config::model::AutovendaConfig;
use autovenda_core::types::{HistoryEntry, Subscription, SubscriptionStatus};
use autovenda_core::{AutovendaError, StorageAdapter};
use autovenda_skill::SkillRegistry;
use autovenda_storage::HistoryStore;

use crate::serve::open_storage;

fn use_color(plain: bool) -> bool {
    !plain && std::io::stdout().is_terminal()
}

/// Run `autovenda skills [--dir]`.
pub fn run_skills(
    config: &AutovendaConfig,
    dir: Option<PathBuf>,
    plain: bool,
) -> Result<(), AutovendaError> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.skills.directory));
    let (registry, errors) = SkillRegistry::load(&dir);
    print!("{}", format_skills(&dir, &registry, &errors, use_color(plain)));
    Ok(())
}

pub fn format_skills(
    dir: &Path,
    registry: &SkillRegistry,
    errors: &[AutovendaError],
    color: bool,
) -> String {
    let mut out = format!("\n  skills in {}\n  {}\n", dir.display(), "-".repeat(50));
    for skill in registry.list() {
        let hook = skill.hook.map(|h| h.to_string()).unwrap_or_else(|| "-".into());
        let gated = if skill.gated { " (requires active subscription)" } else { "" };
        out.push_str(&format!(
            "    {:<16} hook={:<13} triggers={}{}\n",
            skill.name,
            hook,
            skill.triggers.len(),
            gated
        ));
    }
    for err in errors {
        let mark = if color {
            use colored::Colorize;
            "✗".red().to_string()
        } else {
            "[FAIL]".to_string()
        };
        out.push_str(&format!("    {mark} {err}\n"));
    }
    out.push_str(&format!(
        "\n  {} loaded, {} rejected\n\n",
        registry.len(),
        errors.len()
    ));
    out
}

/// Run `autovenda leads`.
pub async fn run_leads(config: &AutovendaConfig, plain: bool) -> Result<(), AutovendaError> {
    let storage = open_storage(config).await?;
    let rows = storage.list_subscriptions().await?;
    print!("{}", format_leads(&rows, use_color(plain)));
    Ok(())
}

fn status_label(status: SubscriptionStatus, color: bool) -> String {
    let label = format!("{:<15}", status.to_string());
    if !color {
        return label;
    }
    use colored::Colorize;
    match status {
        SubscriptionStatus::Lead => label.normal().to_string(),
        SubscriptionStatus::PendingPayment => label.yellow().to_string(),
        SubscriptionStatus::Active => label.green().to_string(),
    }
}

pub fn format_leads(rows: &[Subscription], color: bool) -> String {
    if rows.is_empty() {
        return "no subscriptions yet\n".to_string();
    }
    let mut out = format!(
        "{:<14} {:<22} {:<15} {:>10}  {}\n",
        "USER", "PLAN", "STATUS", "PRICE", "UPDATED"
    );
    for row in rows {
        let price = row
            .monthly_price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:<14} {:<22} {} {:>10}  {}\n",
            row.user_id,
            row.plan.as_deref().unwrap_or("-"),
            status_label(row.status, color),
            price,
            row.updated_at
        ));
    }
    out
}

/// Run `autovenda history <user_id> [--limit N]`.
pub async fn run_history(
    config: &AutovendaConfig,
    user_id: &str,
    limit: Option<usize>,
) -> Result<(), AutovendaError> {
    let storage = open_storage(config).await?;
    let history = HistoryStore::new(storage, config.agent.history_window);
    let entries = history
        .recent(user_id, limit.unwrap_or(config.agent.history_window))
        .await?;
    print!("{}", format_history(user_id, &entries));
    Ok(())
}

pub fn format_history(user_id: &str, entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return format!("no history for {user_id}\n");
    }
    entries
        .iter()
        .map(|e| format!("[{}] {}\n", e.role, e.content))
        .collect()
}

/// Run `autovenda subscription reset <user_id>`.
pub async fn run_reset(config: &AutovendaConfig, user_id: &str) -> Result<(), AutovendaError> {
    let storage = open_storage(config).await?;
    let gate = SubscriptionGate::new(storage);
    if gate.reset(user_id).await? {
        println!("subscription for {user_id} reset to lead");
        Ok(())
    } else {
        Err(AutovendaError::UserNotFound {
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use autovenda_core::types::Role;
    use autovenda_skill::parse_manifest;

    use super::*;

    fn subscription(user: &str, status: SubscriptionStatus) -> Subscription {
        Subscription {
            user_id: user.into(),
            plan: Some("flash".into()),
            monthly_price: Some(159.99),
            status,
            provider_customer_id: None,
            provider_subscription_id: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-02T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn leads_table_lists_every_row() {
        let out = format_leads(
            &[
                subscription("u1", SubscriptionStatus::Lead),
                subscription("u2", SubscriptionStatus::Active),
            ],
            false,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("USER"));
        assert!(lines[2].contains("active"));
        assert!(lines[2].contains("159.99"));
    }

    #[test]
    fn empty_leads_table() {
        assert_eq!(format_leads(&[], false), "no subscriptions yet\n");
    }

    #[test]
    fn history_lines_show_roles() {
        let entries = vec![
            HistoryEntry::new(Role::User, "oi"),
            HistoryEntry::new(Role::Assistant, "olá!"),
        ];
        assert_eq!(format_history("u1", &entries), "[user] oi\n[assistant] olá!\n");
        assert_eq!(format_history("u1", &[]), "no history for u1\n");
    }

    #[test]
    fn skills_listing_reports_rejections() {
        let mut registry = SkillRegistry::new();
        registry
            .register(
                parse_manifest(
                    "[skill]\nname = \"onboarding\"\ntriggers = [\"site\"]\nhook = \"onboarding\"\ngated = true\n",
                    "inline",
                )
                .unwrap(),
            )
            .unwrap();
        let errors = vec![AutovendaError::RegistryLoad {
            path: "skills/broken/skill.toml".into(),
            message: "invalid TOML".into(),
        }];

        let out = format_skills(Path::new("skills"), &registry, &errors, false);
        assert!(out.contains("onboarding"));
        assert!(out.contains("hook=onboarding"));
        assert!(out.contains("requires active subscription"));
        assert!(out.contains("[FAIL] skill registry error in skills/broken/skill.toml"));
        assert!(out.contains("1 loaded, 1 rejected"));
    }
}
