// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-payment onboarding: contact channel, site and objectives.
//!
//! Gated on an active subscription. Fields are upserted as they arrive, so
//! a retry after a partial failure re-derives and rewrites the same row.

use std::sync::LazyLock;

use autovenda_core::types::{ConfigurationStatus, OnboardingUpdate};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::{HookContext, HookData, HookFailure, HookInput, HookOutcome};

pub const BLOCKED_REASON: &str = "Onboarding não permitido. Assinatura não identificada como ativa.";

const MAX_OBJECTIVES: usize = 5;
const MIN_OBJECTIVES_LEN: usize = 6;

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-()]{7,20}\d").unwrap());
static PHONE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-()]+").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\w-]+\.(com\.br|com|net|org|io|tech)(/\S*)?").unwrap()
});
static OBJECTIVE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n;]+|,\s*").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingSummary {
    pub contact_channel: String,
    pub site_url: String,
    pub objectives: String,
}

pub(crate) async fn run(ctx: &HookContext, input: &HookInput<'_>) -> HookOutcome {
    let user_id = input.user_id;
    match ctx.gate().is_active(user_id).await {
        Ok(true) => {}
        Ok(false) => return HookOutcome::Blocked(BLOCKED_REASON.to_string()),
        Err(e) => return HookOutcome::Error(HookFailure::internal(e.to_string())),
    }

    let combined = input.user_combined();
    let contact = extract_phone(&combined);
    let site = extract_url(&combined);
    let objectives = extract_objectives(&combined);

    let (Some(contact_channel), Some(site_url), Some(objectives)) =
        (contact.clone(), site.clone(), objectives.clone())
    else {
        let mut missing = Vec::new();
        if contact.is_none() {
            missing.push("whatsapp");
        }
        if site.is_none() {
            missing.push("website");
        }
        if objectives.is_none() {
            missing.push("objetivos");
        }
        if missing.len() < 3 {
            let partial = OnboardingUpdate {
                contact_channel: contact,
                site_url: site,
                objectives,
                configuration_status: None,
            };
            if let Err(e) = ctx.storage.upsert_onboarding(user_id, &partial).await {
                warn!(user_id, error = %e, "failed to store partial onboarding");
            }
        }
        return HookOutcome::missing(&missing);
    };

    let update = OnboardingUpdate {
        contact_channel: Some(contact_channel.clone()),
        site_url: Some(site_url.clone()),
        objectives: Some(objectives.clone()),
        configuration_status: Some(ConfigurationStatus::Completo),
    };
    if let Err(e) = ctx.storage.upsert_onboarding(user_id, &update).await {
        return HookOutcome::Error(HookFailure::internal(e.to_string()));
    }
    info!(user_id, "onboarding completed");

    HookOutcome::Complete(HookData::Onboarding(OnboardingSummary {
        contact_channel,
        site_url,
        objectives,
    }))
}

/// Phone-like digit run with separators removed.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE
        .find(text)
        .map(|m| PHONE_SEPARATORS.replace_all(m.as_str(), "").into_owned())
}

/// Explicit URL, else a bare domain with a common TLD.
pub fn extract_url(text: &str) -> Option<String> {
    URL.find(text)
        .or_else(|| BARE_DOMAIN.find(text))
        .map(|m| m.as_str().to_string())
}

/// Up to five objectives joined by `"; "`. Text too short to hold any is ignored.
pub fn extract_objectives(text: &str) -> Option<String> {
    let text = text.trim();
    if text.chars().count() < MIN_OBJECTIVES_LEN {
        return None;
    }
    let items: Vec<&str> = OBJECTIVE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(MAX_OBJECTIVES)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items.join("; "))
    }
}
