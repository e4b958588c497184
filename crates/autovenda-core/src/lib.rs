// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Auto-Venda sales agent.
//!
//! This crate provides the trait definitions, error taxonomy, and domain
//! types shared across the workspace. Storage, LLM, channel and payment
//! adapters implement the traits defined here.

pub mod error;
pub mod plans;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AutovendaError;
pub use types::{AdapterType, HealthStatus, MessageId, Role, SubscriptionStatus};

pub use traits::{ChannelAdapter, PaymentGateway, PluginAdapter, ProviderAdapter, StorageAdapter};
