// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Auto-Venda sales agent.
//!
//! Receives payment-provider webhooks and answers liveness probes. It runs
//! beside the messaging loop and shares the store with it.

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState};
