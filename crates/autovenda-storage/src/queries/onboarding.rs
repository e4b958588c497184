// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Onboarding record operations.

use autovenda_core::AutovendaError;
use autovenda_core::types::{OnboardingRecord, OnboardingUpdate};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, now_timestamp, Database};
use crate::queries::parse_column;

pub async fn get_onboarding(
    db: &Database,
    user_id: &str,
) -> Result<Option<OnboardingRecord>, AutovendaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, contact_channel, site_url, objectives, collected_at,
                        configuration_status
                 FROM onboarding WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(OnboardingRecord {
                        user_id: row.get(0)?,
                        contact_channel: row.get(1)?,
                        site_url: row.get(2)?,
                        objectives: row.get(3)?,
                        collected_at: row.get(4)?,
                        configuration_status: parse_column(row.get(5)?, 5)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert by user id. `None` fields keep whatever is already stored.
pub async fn upsert_onboarding(
    db: &Database,
    user_id: &str,
    update: &OnboardingUpdate,
) -> Result<(), AutovendaError> {
    let user_id = user_id.to_string();
    let update = update.clone();
    let collected_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO onboarding
                     (user_id, contact_channel, site_url, objectives, collected_at, configuration_status)
                 VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 'pendente'))
                 ON CONFLICT(user_id) DO UPDATE SET
                     contact_channel = COALESCE(excluded.contact_channel, onboarding.contact_channel),
                     site_url = COALESCE(excluded.site_url, onboarding.site_url),
                     objectives = COALESCE(excluded.objectives, onboarding.objectives),
                     collected_at = excluded.collected_at,
                     configuration_status = COALESCE(?6, onboarding.configuration_status)",
                params![
                    user_id,
                    update.contact_channel,
                    update.site_url,
                    update.objectives,
                    collected_at,
                    update.configuration_status.map(|s| s.to_string()),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
