// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Auto-Venda sales agent.

use thiserror::Error;

/// The primary error type used across all adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum AutovendaError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The persistent store is unreachable or rejected a write.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single skill definition could not be loaded.
    #[error("skill registry error in {path}: {message}")]
    RegistryLoad { path: String, message: String },

    /// A plan was referenced that has no provider price mapping.
    #[error("unknown plan: {plan}")]
    UnknownPlan { plan: String },

    /// A checkout was requested for a user whose subscription is already active.
    #[error("subscription already active for user {user_id}")]
    AlreadySubscribed { user_id: String },

    /// An extraction hook failed while running its side effects.
    #[error("hook {hook} failed: {message}")]
    Hook { hook: String, message: String },

    /// A payment event was malformed or failed verification.
    #[error("webhook validation failed: {0}")]
    WebhookValidation(String),

    /// A payment event referenced a user with no subscription row.
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    /// LLM provider errors (API failure, empty candidates, bad response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Payment provider errors (checkout creation failed, bad response).
    #[error("payment error: {message}")]
    Payment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel adapter errors (connection failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AutovendaError {
    /// Wraps any error as a persistence failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence {
            source: Box::new(err),
        }
    }

    /// Returns true when the error means the store could not be reached or written.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
