// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Auto-Venda integration testing.
//!
//! - [`MockProvider`]: deterministic model replies from a queue
//! - [`MockChannel`]: injectable inbound, captured outbound messages
//! - [`MockPaymentGateway`]: deterministic checkout URLs and JSON webhooks
//! - [`TestHarness`]: the whole conversation stack on a temp database

pub mod harness;
pub mod mock_channel;
pub mod mock_payment;
pub mod mock_provider;

pub use harness::{skills_dir, test_prices, TestHarness, TestHarnessBuilder};
pub use mock_channel::{inbound, MockChannel};
pub use mock_payment::{completed_event, MockPaymentGateway, INVALID_SIGNATURE};
pub use mock_provider::MockProvider;
