// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing for the Auto-Venda sales agent.
//!
//! [`SubscriptionGate`] owns the `lead -> pending_payment -> active`
//! lifecycle, [`PaymentSessionBroker`] creates checkouts and reconciles
//! payment callbacks, and [`StripeGateway`] talks to Stripe Checkout.

pub mod broker;
pub mod gate;
pub mod stripe;

pub use broker::{ActivationNotice, PaymentSessionBroker};
pub use gate::SubscriptionGate;
pub use stripe::StripeGateway;
