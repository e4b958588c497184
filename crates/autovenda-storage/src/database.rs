// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! Every statement runs on tokio-rusqlite's single background thread, which
//! makes each row update its own serialized unit without a global lock.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use autovenda_core::AutovendaError;
use tracing::debug;

/// Convert a tokio-rusqlite error into a persistence error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> AutovendaError {
    AutovendaError::Persistence {
        source: Box::new(e),
    }
}

/// Current UTC time in the format stored in every `*_at` column.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and migrate it.
    pub async fn open(path: &str) -> Result<Self, AutovendaError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    ///
    /// Failure to create the file or apply migrations is fatal for the caller.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, AutovendaError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(AutovendaError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(AutovendaError::persistence)?;

        let journal = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.pragma_update_and_check(None, "journal_mode", journal, |row| {
                row.get::<_, String>(0)
            })?;
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<Result<(), AutovendaError>, rusqlite::Error> {
            Ok(crate::migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        debug!(path, journal, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), AutovendaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, consuming the handle.
    pub async fn close(self) -> Result<(), AutovendaError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}
