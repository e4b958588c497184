// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead qualification: niche, daily volume and pain point to a plan tier.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{HookData, HookInput, HookOutcome};

static VOLUME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,4}").unwrap());

/// Qualitative volume phrases, checked in order.
const VOLUME_PHRASES: &[(&[&str], u32)] = &[
    (&["pouco", "baixo", "menos de 10", "<10"], 5),
    (&["muitos", "muito", "mais de 50", ">50"], 100),
    (&["10-50", "entre 10 e 50"], 30),
];

/// Niche keyword table. First matching niche wins.
const NICHES: &[(&str, &[&str])] = &[
    ("restaurante", &["restaur", "bar", "café", "delivery"]),
    ("ecommerce", &["loja", "ecommerce", "shop", "produto"]),
    ("imobiliária", &["imobili", "imóvel", "corretor"]),
    ("automotivo", &["oficina", "carro", "automotivo"]),
    ("saúde/estética", &["clínica", "estética", "consultório", "beleza"]),
    ("educação", &["escola", "curso", "educa"]),
];

const PAINS: &[(&[&str], &str)] = &[
    (&["demora", "atendimento lento", "tempo"], "demora no atendimento"),
    (
        &["perda", "perdemos", "nao responde", "não responde"],
        "perda de vendas por falta de resposta",
    ),
    (&["agendamento", "agenda"], "necessidade de agendamento"),
];

const SCHEDULING_PAIN: &str = "necessidade de agendamento";
const SLOW_SERVICE_PAIN: &str = "demora no atendimento";

pub const FLASH_TIER: &str = "Plano Flash";
pub const MID_SCHEDULING_TIER: &str = "Secretária Virtual (Plano Médio)";
pub const MID_TIER: &str = "Plano Profissional";
pub const ENTERPRISE_TIER: &str = "Ecossistema / Secretária Virtual (Enterprise)";

const ESCALATION: &str = "recomendar contato com equipe técnica para arquitetura e SLAs";

/// A qualified lead with the recommended tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadProfile {
    pub niche: String,
    pub volume: u32,
    /// Human-readable volume, e.g. `"30 leads/dia"`.
    pub volume_label: String,
    pub pain: Option<String>,
    pub plan: String,
    pub rationale: String,
    pub next_steps: Vec<String>,
    /// Set when the volume calls for a technical sales conversation.
    pub escalation: Option<String>,
}

pub(crate) fn run(input: &HookInput<'_>) -> Option<HookOutcome> {
    let combined = input.combined().to_lowercase();

    let niche = detect_niche(input);
    let volume = detect_volume(&combined);

    let (niche, volume) = match (niche, volume) {
        (Some(n), Some(v)) => (n, v),
        (niche, volume) => {
            let mut missing = Vec::new();
            if niche.is_none() {
                missing.push("niche");
            }
            if volume.is_none() {
                missing.push("volume");
            }
            return Some(HookOutcome::missing(&missing));
        }
    };

    Some(HookOutcome::Complete(HookData::Lead(qualify(
        niche,
        volume,
        detect_pain(&combined),
    ))))
}

/// Niche from the user text first, then history newest-first.
fn detect_niche(input: &HookInput<'_>) -> Option<&'static str> {
    std::iter::once(input.text)
        .chain(input.tail().iter().rev().map(|e| e.content.as_str()))
        .find_map(|text| niche_in(&text.to_lowercase()))
}

fn niche_in(text_lower: &str) -> Option<&'static str> {
    NICHES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(niche, _)| *niche)
}

/// First explicit digit run, else a qualitative mapping.
pub fn detect_volume(text_lower: &str) -> Option<u32> {
    if let Some(m) = VOLUME.find(text_lower) {
        return m.as_str().parse().ok();
    }
    VOLUME_PHRASES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| text_lower.contains(p)))
        .map(|(_, volume)| *volume)
}

pub fn detect_pain(text_lower: &str) -> Option<&'static str> {
    PAINS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text_lower.contains(k)))
        .map(|(_, pain)| *pain)
}

fn qualify(niche: &str, volume: u32, pain: Option<&str>) -> LeadProfile {
    let (plan, rationale) = match volume {
        v if v < 10 => (
            FLASH_TIER,
            "Volume baixo: solução leve e rápida com automações pré-configuradas.",
        ),
        v if v <= 50 && pain == Some(SCHEDULING_PAIN) => (
            MID_SCHEDULING_TIER,
            "Volume médio e necessidade de agendamento: automatizar agendamento e triagem.",
        ),
        v if v <= 50 => (
            MID_TIER,
            "Volume médio: automações híbridas com roteamento e fallback humano.",
        ),
        _ => (
            ENTERPRISE_TIER,
            "Alto volume: recomenda-se um ecossistema integrado com secretária virtual e filas.",
        ),
    };

    let mut next_steps = Vec::new();
    if plan == FLASH_TIER {
        next_steps.push(
            "Apresentar resumo do Plano Flash e coletar contato para ativação rápida.".to_string(),
        );
    }
    if plan.contains("Secretária") || plan.contains("Ecossistema") {
        next_steps.push("Agendar demonstração técnica para integração e filas.".to_string());
    }
    if pain == Some(SLOW_SERVICE_PAIN) {
        next_steps.push(
            "Sugerir templates de respostas rápidas e roteamento para humano se tempo de espera > X."
                .to_string(),
        );
    }
    if next_steps.is_empty() {
        next_steps.push("Confirmar interesse e agendar follow-up comercial.".to_string());
    }

    LeadProfile {
        niche: niche.to_string(),
        volume,
        volume_label: format!("{volume} leads/dia"),
        pain: pain.map(str::to_string),
        plan: plan.to_string(),
        rationale: rationale.to_string(),
        next_steps,
        escalation: (volume > 50).then(|| ESCALATION.to_string()),
    }
}
