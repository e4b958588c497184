// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proposal and checkout: plan detection, contact extraction and payment
//! session creation through the broker.

use std::sync::LazyLock;

use autovenda_core::plans::{self, Plan};
use autovenda_core::AutovendaError;
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::{FailureKind, HookContext, HookData, HookFailure, HookInput, HookOutcome};

/// Currency of every catalog price.
pub const CURRENCY: &str = "brl";

static LABELED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)nome[:\s-]*([A-ZÀ-Ÿ][a-zà-ÿ]+(?:\s+[A-ZÀ-Ÿ][a-zà-ÿ]+)+)").unwrap()
});

static INTRODUCED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)meu nome é\s+([A-ZÀ-Ÿ][\w\s]+)").unwrap());

static CAPITALIZED_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-ZÀ-Ÿ][a-zà-ÿ]+\s+[A-ZÀ-Ÿ][a-zà-ÿ]+)").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").unwrap());

/// Plan keywords, checked before literal prices.
const PLAN_KEYWORDS: &[(&[&str], &Plan)] = &[
    (&["flash"], &plans::FLASH),
    (&["secret", "secretária", "secretaria"], &plans::SECRETARIA_VIRTUAL),
    (&["ecossistema", "ecossist"], &plans::ECOSSISTEMA_COMPLETO),
];

const PLAN_PRICES: &[(&[&str], &Plan)] = &[
    (&["159"], &plans::FLASH),
    (&["559"], &plans::SECRETARIA_VIRTUAL),
    (&["1499", "1.499"], &plans::ECOSSISTEMA_COMPLETO),
];

/// The payment request handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentPayload {
    pub plan: String,
    pub title: String,
    /// Minor currency units.
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
    pub customer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalResult {
    pub plan_title: String,
    pub price: f64,
    pub payload: PaymentPayload,
    /// Absent when checkout creation failed.
    pub checkout_url: Option<String>,
}

pub(crate) async fn run(ctx: &HookContext, input: &HookInput<'_>) -> Option<HookOutcome> {
    let combined = input.combined();
    let plan = detect_plan(&combined.to_lowercase())?;
    let user_id = input.user_id;

    if let Err(e) = ctx.gate().record_interest(user_id, plan).await {
        warn!(user_id, plan = plan.slug, error = %e, "failed to record plan interest");
    }

    let contact_text = input.user_combined();
    let name = extract_name(&contact_text);
    let email = extract_email(&contact_text);

    if let Some(name) = &name
        && let Err(e) = ctx.storage.set_display_name(user_id, name).await
    {
        warn!(user_id, error = %e, "failed to store customer name");
    }

    let (name, email) = match (name, email) {
        (Some(name), Some(email)) => (name, email),
        (name, email) => {
            let mut missing = Vec::new();
            if name.is_none() {
                missing.push("name");
            }
            if email.is_none() {
                missing.push("email");
            }
            return Some(HookOutcome::missing(&missing));
        }
    };

    let mut result = ProposalResult {
        plan_title: plan.title.to_string(),
        price: plan.price(),
        payload: PaymentPayload {
            plan: plan.slug.to_string(),
            title: plan.title.to_string(),
            amount_cents: plan.price_cents,
            currency: CURRENCY.to_string(),
            customer_email: email,
            customer_name: name,
        },
        checkout_url: None,
    };

    match ctx
        .broker
        .create_session(user_id, plan.slug, Some(&result.payload.customer_email))
        .await
    {
        Ok(session) => {
            info!(user_id, plan = plan.slug, "checkout session created");
            result.checkout_url = Some(session.url);
            Some(HookOutcome::Complete(HookData::Proposal(result)))
        }
        Err(e) => {
            let kind = match e {
                AutovendaError::UnknownPlan { .. } => FailureKind::UnknownPlan,
                AutovendaError::AlreadySubscribed { .. } => FailureKind::AlreadySubscribed,
                AutovendaError::Persistence { .. } => FailureKind::Internal,
                _ => FailureKind::Checkout,
            };
            warn!(user_id, plan = plan.slug, error = %e, "checkout session not created");
            Some(HookOutcome::Error(HookFailure {
                kind,
                message: e.to_string(),
                partial: Some(Box::new(HookData::Proposal(result))),
            }))
        }
    }
}

/// Plan by keyword, falling back to literal price strings.
pub fn detect_plan(text_lower: &str) -> Option<&'static Plan> {
    let lookup = |table: &[(&[&str], &'static Plan)]| {
        table
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| text_lower.contains(n)))
            .map(|(_, plan)| *plan)
    };
    lookup(PLAN_KEYWORDS).or_else(|| lookup(PLAN_PRICES))
}

/// Customer name from a labeled pattern, else the first pair of
/// capitalized words that is not part of a plan title.
pub fn extract_name(text: &str) -> Option<String> {
    if let Some(caps) = LABELED_NAME.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = INTRODUCED_NAME.captures(text) {
        let name = caps[1].trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    CAPITALIZED_PAIR
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| !is_plan_title(candidate))
        .map(str::to_string)
}

fn is_plan_title(candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    plans::CATALOG
        .iter()
        .any(|plan| plan.title.to_lowercase().contains(&candidate))
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}
