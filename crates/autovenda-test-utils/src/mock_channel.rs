// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter with injectable inbound messages and captured
//! outbound messages.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use autovenda_core::traits::adapter::PluginAdapter;
use autovenda_core::traits::channel::ChannelAdapter;
use autovenda_core::types::{
    AdapterType, ChannelCapabilities, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use autovenda_core::AutovendaError;

pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    sent_notify: Arc<Notify>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            sent_notify: Arc::new(Notify::new()),
        }
    }

    /// Queue a message for the next `receive()`.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Waits until at least `count` messages were sent.
    pub async fn wait_for_sent(&self, count: usize) -> Vec<OutboundMessage> {
        loop {
            let notified = self.sent_notify.notified();
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            notified.await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a text message from `sender_id` on the mock channel.
pub fn inbound(sender_id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: uuid::Uuid::new_v4().to_string(),
        channel: "mock".to_string(),
        sender_id: sender_id.to_string(),
        text: text.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        display_name: None,
        contact_handle: None,
        metadata: None,
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_typing: false,
            max_message_length: None,
        }
    }

    async fn connect(&mut self) -> Result<(), AutovendaError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, AutovendaError> {
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        self.sent_notify.notify_waiters();
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundMessage, AutovendaError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let channel = MockChannel::new();
        channel.inject_message(inbound("u1", "first")).await;
        channel.inject_message(inbound("u1", "second")).await;

        assert_eq!(channel.receive().await.unwrap().text, "first");
        assert_eq!(channel.receive().await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let channel = Arc::new(MockChannel::new());
        let channel_clone = channel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            channel_clone.inject_message(inbound("u1", "delayed")).await;
        });

        let received = tokio::time::timeout(Duration::from_secs(2), channel.receive())
            .await
            .expect("receive timed out")
            .unwrap();
        assert_eq!(received.text, "delayed");
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let msg = OutboundMessage {
            channel: "mock".into(),
            recipient_id: "u1".into(),
            content: "olá".into(),
            metadata: None,
        };
        assert!(channel.send(msg).await.unwrap().0.starts_with("mock-msg-"));
        let sent = channel.wait_for_sent(1).await;
        assert_eq!(sent[0].content, "olá");
        assert_eq!(channel.sent_count().await, 1);
    }
}
