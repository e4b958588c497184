// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Auto-Venda sales agent.
//!
//! Implements [`ChannelAdapter`] over teloxide long polling. Private text
//! messages are forwarded to the agent loop; everything else is dropped.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use autovenda_config::model::TelegramConfig;
use autovenda_core::error::AutovendaError;
use autovenda_core::traits::{ChannelAdapter, PluginAdapter};
use autovenda_core::types::{
    AdapterType, ChannelCapabilities, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram's per-message character limit.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: TelegramConfig) -> Result<Self, AutovendaError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            AutovendaError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;
        if token.is_empty() {
            return Err(AutovendaError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, AutovendaError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), AutovendaError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_typing: true,
            max_message_length: Some(MAX_MESSAGE_LENGTH),
        }
    }

    async fn connect(&mut self) -> Result<(), AutovendaError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                let allowed = allowed_users.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-private message");
                        return respond(());
                    }
                    if !handler::is_authorized(&msg, &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }
                    let Some(text) = handler::extract_text(&msg) else {
                        debug!(msg_id = msg.id.0, "ignoring non-text message");
                        return respond(());
                    };

                    let inbound = handler::to_inbound_message(&msg, text);
                    if tx.send(inbound).await.is_err() {
                        warn!("inbound channel closed, dropping message");
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, AutovendaError> {
        let chat_id = extract_chat_id(&msg)?;
        let mut last = None;
        for chunk in split_message(&msg.content, MAX_MESSAGE_LENGTH) {
            let sent = self
                .bot
                .send_message(Recipient::Id(chat_id), chunk)
                .await
                .map_err(|e| AutovendaError::Channel {
                    message: format!("failed to send message: {e}"),
                    source: Some(Box::new(e)),
                })?;
            last = Some(sent.id.0.to_string());
        }
        last.map(MessageId).ok_or_else(|| AutovendaError::Channel {
            message: "refusing to send an empty message".into(),
            source: None,
        })
    }

    async fn receive(&self) -> Result<InboundMessage, AutovendaError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| AutovendaError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn send_typing(&self, recipient_id: &str) -> Result<(), AutovendaError> {
        let chat_id = parse_chat_id(recipient_id)?;
        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .map_err(|e| AutovendaError::Channel {
                message: format!("failed to send typing indicator: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

fn parse_chat_id(raw: &str) -> Result<ChatId, AutovendaError> {
    raw.parse::<i64>()
        .map(ChatId)
        .map_err(|e| AutovendaError::Channel {
            message: format!("invalid chat_id '{raw}': {e}"),
            source: None,
        })
}

/// Chat ID from metadata, else the recipient (user and chat IDs coincide
/// in private chats).
fn extract_chat_id(msg: &OutboundMessage) -> Result<ChatId, AutovendaError> {
    if let Some(metadata) = &msg.metadata
        && let Ok(meta) = serde_json::from_str::<serde_json::Value>(metadata)
        && let Some(chat_id) = meta.get("chat_id").and_then(|v| v.as_str())
    {
        return parse_chat_id(chat_id);
    }
    parse_chat_id(&msg.recipient_id)
}

/// Splits `text` into chunks of at most `limit` characters, preferring
/// line breaks.
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if rest.chars().count() <= limit {
            chunks.push(rest);
            break;
        }
        let hard = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = rest[..hard]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map(|i| i + 1)
            .unwrap_or(hard);
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    chunks
}
