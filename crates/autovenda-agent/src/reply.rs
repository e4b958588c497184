// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing text for hook outcomes.

use autovenda_core::plans::{self, CATALOG};
use autovenda_skill::hooks::{LeadProfile, OnboardingSummary, ProposalResult};
use autovenda_skill::{FailureKind, HookData, HookOutcome};

/// Renders an outcome. `None` for internal failures, which the caller
/// answers with the generic apology.
pub fn render_outcome(outcome: &HookOutcome) -> Option<String> {
    match outcome {
        HookOutcome::Complete(data) => Some(render_data(data)),
        HookOutcome::Missing(fields) => Some(render_missing(fields)),
        HookOutcome::Blocked(reason) => Some(format!(
            "🔒 {reason} Assim que o pagamento for confirmado, seguimos com a configuração."
        )),
        HookOutcome::Error(failure) => match failure.kind {
            FailureKind::UnknownPlan => Some(render_plan_clarification()),
            FailureKind::Checkout => Some(match failure.partial.as_deref() {
                Some(HookData::Proposal(result)) => render_unavailable_checkout(result),
                _ => "⚠️ Não consegui gerar o link de pagamento agora. Tente novamente em instantes."
                    .to_string(),
            }),
            FailureKind::AlreadySubscribed => Some(
                "✅ Sua assinatura já está ativa, então não gerei um novo link de pagamento. \
                 Para configurar sua automação, me envie seu WhatsApp com DDD, o endereço do \
                 seu site e seus principais objetivos."
                    .to_string(),
            ),
            FailureKind::Internal => None,
        },
    }
}

fn render_data(data: &HookData) -> String {
    match data {
        HookData::Lead(profile) => render_lead(profile),
        HookData::Proposal(result) => render_proposal(result),
        HookData::Onboarding(summary) => render_onboarding(summary),
        HookData::Notice { text } => text.clone(),
    }
}

fn render_lead(profile: &LeadProfile) -> String {
    let mut text = format!(
        "📋 Diagnóstico: {niche}, cerca de {volume}.",
        niche = profile.niche,
        volume = profile.volume_label
    );
    if let Some(pain) = &profile.pain {
        text.push_str(&format!(" Principal dor: {pain}."));
    }
    text.push_str(&format!(
        "\nRecomendação: {}. {}",
        profile.plan, profile.rationale
    ));
    for step in &profile.next_steps {
        text.push_str(&format!("\n• {step}"));
    }
    if let Some(escalation) = &profile.escalation {
        text.push_str(&format!("\n⚠️ {escalation}"));
    }
    text
}

fn price_label(result: &ProposalResult) -> String {
    plans::format_brl(result.payload.amount_cents)
}

fn render_proposal(result: &ProposalResult) -> String {
    match &result.checkout_url {
        Some(url) => format!(
            "✅ Plano {title} ({price}/mês) para {name}.\nFinalize sua assinatura aqui: {url}",
            title = result.plan_title,
            price = price_label(result),
            name = result.payload.customer_name,
        ),
        None => render_unavailable_checkout(result),
    }
}

fn render_unavailable_checkout(result: &ProposalResult) -> String {
    format!(
        "📝 Plano {title} ({price}/mês) para {name} <{email}>.\n⚠️ O link de pagamento está indisponível no momento; nossa equipe enviará em instantes.",
        title = result.plan_title,
        price = price_label(result),
        name = result.payload.customer_name,
        email = result.payload.customer_email,
    )
}

fn render_onboarding(summary: &OnboardingSummary) -> String {
    format!(
        "🎉 Onboarding concluído!\nWhatsApp: {}\nSite: {}\nObjetivos: {}\nNossa equipe já vai iniciar a configuração.",
        summary.contact_channel, summary.site_url, summary.objectives
    )
}

fn field_label(field: &str) -> &str {
    match field {
        "name" => "seu nome completo",
        "email" => "seu e-mail",
        "niche" => "o segmento do seu negócio",
        "volume" => "quantos contatos você recebe por dia",
        "whatsapp" => "seu WhatsApp com DDD",
        "website" => "o endereço do seu site",
        "objetivos" => "seus principais objetivos com a automação",
        other => other,
    }
}

fn render_missing(fields: &[String]) -> String {
    let labels: Vec<&str> = fields.iter().map(|f| field_label(f)).collect();
    let list = match labels.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} e {}", init.join(", "), last),
    };
    format!("Para continuar, preciso de {list}.")
}

/// Clarification question listing the sellable plans.
pub fn render_plan_clarification() -> String {
    let options = CATALOG
        .iter()
        .map(|plan| format!("• {} ({}/mês)", plan.title, plans::format_brl(plan.price_cents)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Qual destes planos você gostaria de contratar?\n{options}")
}

/// Model text first, hook text after. Either may be absent.
pub fn merge(model_text: Option<&str>, hook_text: Option<&str>) -> Option<String> {
    let model_text = model_text.map(str::trim).filter(|t| !t.is_empty());
    match (model_text, hook_text) {
        (Some(model), Some(hook)) => Some(format!("{model}\n\n{hook}")),
        (Some(model), None) => Some(model.to_string()),
        (None, Some(hook)) => Some(hook.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autovenda_skill::hooks::PaymentPayload;
    use autovenda_skill::HookFailure;

    fn proposal(url: Option<&str>) -> ProposalResult {
        ProposalResult {
            plan_title: "Secretária Virtual".into(),
            price: 559.99,
            payload: PaymentPayload {
                plan: "secretaria_virtual".into(),
                title: "Secretária Virtual".into(),
                amount_cents: 55_999,
                currency: "brl".into(),
                customer_email: "joao@example.com".into(),
                customer_name: "João Silva".into(),
            },
            checkout_url: url.map(str::to_string),
        }
    }

    #[test]
    fn missing_fields_become_one_question() {
        let text = render_outcome(&HookOutcome::Missing(vec!["name".into(), "email".into()]));
        assert_eq!(
            text.as_deref(),
            Some("Para continuar, preciso de seu nome completo e seu e-mail.")
        );
        let text = render_missing(&["whatsapp".into(), "website".into(), "objetivos".into()]);
        assert!(text.contains("seu WhatsApp com DDD, o endereço do seu site e"));
    }

    #[test]
    fn proposal_with_link() {
        let text = render_outcome(&HookOutcome::Complete(HookData::Proposal(proposal(Some(
            "https://checkout.test/cs_1",
        )))))
        .unwrap();
        assert!(text.contains("R$ 559,99/mês"));
        assert!(text.contains("https://checkout.test/cs_1"));
    }

    #[test]
    fn failed_checkout_shows_progress_without_link() {
        let outcome = HookOutcome::Error(HookFailure {
            kind: FailureKind::Checkout,
            message: "provider down".into(),
            partial: Some(Box::new(HookData::Proposal(proposal(None)))),
        });
        let text = render_outcome(&outcome).unwrap();
        assert!(text.contains("Secretária Virtual"));
        assert!(text.contains("indisponível"));
        assert!(!text.contains("http"));
    }

    #[test]
    fn unknown_plan_asks_for_clarification() {
        let outcome = HookOutcome::Error(HookFailure {
            kind: FailureKind::UnknownPlan,
            message: "unknown plan: x".into(),
            partial: None,
        });
        let text = render_outcome(&outcome).unwrap();
        assert!(text.starts_with("Qual destes planos"));
        assert_eq!(text.lines().count(), 1 + CATALOG.len());
    }

    #[test]
    fn internal_failures_render_nothing() {
        let outcome = HookOutcome::Error(HookFailure::internal("db gone"));
        assert!(render_outcome(&outcome).is_none());
    }

    #[test]
    fn merge_orders_model_then_hook() {
        assert_eq!(merge(Some("Oi!"), Some("Hook")).as_deref(), Some("Oi!\n\nHook"));
        assert_eq!(merge(Some("  "), Some("Hook")).as_deref(), Some("Hook"));
        assert_eq!(merge(None, None), None);
    }
}
