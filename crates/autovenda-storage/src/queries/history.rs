// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log operations.

use autovenda_core::AutovendaError;
use autovenda_core::types::{Role, StoredMessage};
use rusqlite::params;

use crate::database::{map_tr_err, now_timestamp, Database};
use crate::queries::parse_column;

/// Append one message and return its sequence id.
pub async fn append_message(
    db: &Database,
    user_id: &str,
    role: Role,
    content: &str,
) -> Result<i64, AutovendaError> {
    let user_id = user_id.to_string();
    let content = content.to_string();
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (user_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, role.to_string(), content, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest `limit` messages for a user, returned oldest first.
pub async fn recent_messages(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<StoredMessage>, AutovendaError> {
    let user_id = user_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, role, content, created_at
                 FROM messages WHERE user_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                Ok(StoredMessage {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: parse_column(row.get(2)?, 2)?,
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            let mut messages = rows.collect::<Result<Vec<_>, _>>()?;
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
