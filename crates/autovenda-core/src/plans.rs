// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fixed catalog of sellable plans.

use serde::Serialize;

/// A sellable subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Stable identifier stored on subscription rows and used as price-map key.
    pub slug: &'static str,
    pub title: &'static str,
    /// Monthly price in centavos.
    pub price_cents: i64,
}

impl Plan {
    /// Monthly price in reais.
    pub fn price(&self) -> f64 {
        self.price_cents as f64 / 100.0
    }
}

pub const FLASH: Plan = Plan {
    slug: "flash",
    title: "Atendimento Flash",
    price_cents: 15_999,
};

pub const SECRETARIA_VIRTUAL: Plan = Plan {
    slug: "secretaria_virtual",
    title: "Secretária Virtual",
    price_cents: 55_999,
};

pub const ECOSSISTEMA_COMPLETO: Plan = Plan {
    slug: "ecossistema_completo",
    title: "Ecossistema Completo",
    price_cents: 149_999,
};

/// All plans, cheapest first.
pub const CATALOG: &[Plan] = &[FLASH, SECRETARIA_VIRTUAL, ECOSSISTEMA_COMPLETO];

/// Formats centavos the Brazilian way, e.g. `R$ 1.499,99`.
pub fn format_brl(cents: i64) -> String {
    let reais = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, digit) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("R$ {grouped},{:02}", cents % 100)
}

/// Looks up a plan by slug.
pub fn find(slug: &str) -> Option<&'static Plan> {
    CATALOG.iter().find(|p| p.slug == slug)
}
