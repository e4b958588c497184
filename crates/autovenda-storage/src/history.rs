// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-user conversation history on top of a [`StorageAdapter`].

use std::sync::Arc;

use autovenda_core::types::{HistoryEntry, Role};
use autovenda_core::{AutovendaError, StorageAdapter};
use tracing::warn;

/// Default number of entries replayed into a turn.
pub const DEFAULT_WINDOW: usize = 10;

/// Append-only message log with a bounded recent window.
#[derive(Clone)]
pub struct HistoryStore {
    storage: Arc<dyn StorageAdapter>,
    window: usize,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn StorageAdapter>, window: usize) -> Self {
        Self {
            storage,
            window: window.max(1),
        }
    }

    /// The configured window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Append one message.
    ///
    /// Content is sanitized rather than rejected; only an unreachable or
    /// failing store produces an error.
    pub async fn append(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
    ) -> Result<(), AutovendaError> {
        let sanitized = sanitize(content);
        if sanitized.len() != content.len() {
            warn!(user_id, "stripped control characters from message before storing");
        }
        self.storage
            .append_message(user_id, role, &sanitized)
            .await
            .map(|_| ())
    }

    /// The newest `limit` entries for a user, oldest first.
    pub async fn recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, AutovendaError> {
        let messages = self.storage.recent_messages(user_id, limit).await?;
        Ok(messages.into_iter().map(HistoryEntry::from).collect())
    }

    /// [`recent`](Self::recent) with the configured window.
    pub async fn recent_window(&self, user_id: &str) -> Result<Vec<HistoryEntry>, AutovendaError> {
        self.recent(user_id, self.window).await
    }
}

/// Drop NUL and other non-whitespace control characters.
fn sanitize(content: &str) -> String {
    content
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
