// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead and customer profile operations.

use autovenda_core::AutovendaError;
use autovenda_core::types::UserProfile;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, now_timestamp, Database};

/// Create the user on first contact; later calls only fill empty fields.
pub async fn upsert_user(
    db: &Database,
    user_id: &str,
    display_name: Option<&str>,
    contact_handle: Option<&str>,
) -> Result<(), AutovendaError> {
    let user_id = user_id.to_string();
    let display_name = display_name.map(str::to_string);
    let contact_handle = contact_handle.map(str::to_string);
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, display_name, contact_handle, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     display_name = COALESCE(users.display_name, excluded.display_name),
                     contact_handle = COALESCE(users.contact_handle, excluded.contact_handle)",
                params![user_id, display_name, contact_handle, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user(db: &Database, user_id: &str) -> Result<Option<UserProfile>, AutovendaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, display_name, contact_handle, created_at
                 FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        display_name: row.get(1)?,
                        contact_handle: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the display name, creating the user if needed.
pub async fn set_display_name(db: &Database, user_id: &str, name: &str) -> Result<(), AutovendaError> {
    let user_id = user_id.to_string();
    let name = name.to_string();
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, display_name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET display_name = excluded.display_name",
                params![user_id, name, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_keeps_first_values() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();

        upsert_user(&db, "42", Some("Ana"), None).await.unwrap();
        upsert_user(&db, "42", Some("Outra"), Some("@ana")).await.unwrap();

        let user = get_user(&db, "42").await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
        assert_eq!(user.contact_handle.as_deref(), Some("@ana"));
        assert!(get_user(&db, "43").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_display_name_overwrites() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();

        upsert_user(&db, "42", Some("ana"), None).await.unwrap();
        set_display_name(&db, "42", "Ana Souza").await.unwrap();
        set_display_name(&db, "7", "Bruno Lima").await.unwrap();

        let user = get_user(&db, "42").await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ana Souza"));
        assert!(get_user(&db, "7").await.unwrap().is_some());
    }
}
