// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned replies that keep the persona on brand.

use super::{HookContext, HookData, HookInput, HookOutcome};

const VEHICLE_TERMS: &[&str] = &["carro", "carros", "veículo", "veiculos", "carroceria"];
const TRADE_TERMS: &[&str] = &["comprar", "vender", "venda", "preço do carro"];
const COMPETITOR_TERMS: &[&str] = &[
    "concorr",
    "outra agência",
    "outras agências",
    "competidor",
    "agência concorrente",
    "agencia concorrente",
];
const IDENTITY_TERMS: &[&str] = &[
    "quem é você",
    "quem e você",
    "como se chama",
    "qual é seu nome",
    "qual o seu nome",
];

pub const VEHICLE_REPLY: &str =
    "Auto vem de Automático! Eu automatizo processos, não vendo veículos. 🚫🚗";
pub const COMPETITOR_REPLY: &str =
    "Nossa IA tem memória de longo prazo e integração nativa com o seu financeiro.";

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

pub(crate) fn run(ctx: &HookContext, input: &HookInput<'_>) -> Option<HookOutcome> {
    reply_for(&input.combined().to_lowercase(), &ctx.persona)
        .map(|text| HookOutcome::Complete(HookData::Notice { text }))
}

/// The first brand rule that fires, if any.
pub fn reply_for(text_lower: &str, persona: &str) -> Option<String> {
    if text_lower.contains("auto")
        && (contains_any(text_lower, VEHICLE_TERMS) || contains_any(text_lower, TRADE_TERMS))
    {
        return Some(VEHICLE_REPLY.to_string());
    }
    if contains_any(text_lower, COMPETITOR_TERMS) {
        return Some(COMPETITOR_REPLY.to_string());
    }
    if contains_any(text_lower, IDENTITY_TERMS) {
        return Some(format!(
            "Meu nome é {persona}, sua consultora de automação. 🤝"
        ));
    }
    None
}
