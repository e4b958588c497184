// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging front ends.

use async_trait::async_trait;

use crate::error::AutovendaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelCapabilities, InboundMessage, MessageId, OutboundMessage};

/// Adapter for a bidirectional messaging channel.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Returns the capabilities supported by this channel.
    fn capabilities(&self) -> ChannelCapabilities;

    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), AutovendaError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, AutovendaError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, AutovendaError>;

    /// Shows a typing indicator to the recipient. Default: no-op.
    async fn send_typing(&self, _recipient_id: &str) -> Result<(), AutovendaError> {
        Ok(())
    }
}
