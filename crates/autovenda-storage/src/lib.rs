// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Auto-Venda sales agent.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer model via
//! `tokio-rusqlite`. Holds the message log, lead profiles, subscription
//! lifecycle rows and onboarding records.

pub mod adapter;
pub mod database;
pub mod history;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use history::{HistoryStore, DEFAULT_WINDOW};
