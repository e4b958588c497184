// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message filtering and conversion to [`InboundMessage`].
//!
//! Only private text messages are processed. The bot talks to prospects, so
//! an empty allow-list admits everyone.

use autovenda_core::types::InboundMessage;
use teloxide::prelude::*;
use teloxide::types::ChatKind;

/// Checks whether the sender may talk to the bot.
///
/// Passes when `allowed_users` is empty, or when the sender's user ID or
/// username (with or without `@`) is listed. Messages without a sender
/// are never authorized.
pub fn is_authorized(msg: &Message, allowed_users: &[String]) -> bool {
    let Some(user) = msg.from.as_ref() else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        *allowed == user_id
            || user.username.as_deref().is_some_and(|username| {
                username.eq_ignore_ascii_case(allowed.strip_prefix('@').unwrap_or(allowed))
            })
    })
}

/// Group, supergroup and channel messages are ignored.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// The message text, if this is a non-empty text message.
pub fn extract_text(msg: &Message) -> Option<String> {
    msg.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Converts a Telegram message into an [`InboundMessage`].
///
/// The sender's Telegram user ID is the conversation user id; the chat ID
/// travels in metadata for routing replies.
pub fn to_inbound_message(msg: &Message, text: String) -> InboundMessage {
    let sender = msg.from.as_ref();
    let sender_id = sender
        .map(|u| u.id.0.to_string())
        .unwrap_or_else(|| msg.chat.id.0.to_string());

    let metadata = serde_json::json!({ "chat_id": msg.chat.id.0.to_string() }).to_string();

    InboundMessage {
        id: msg.id.0.to_string(),
        channel: "telegram".to_string(),
        sender_id,
        text,
        timestamp: chrono::DateTime::to_rfc3339(&msg.date),
        display_name: sender.map(|u| u.full_name()),
        contact_handle: sender.and_then(|u| u.username.as_ref().map(|name| format!("@{name}"))),
        metadata: Some(metadata),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_private_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let mut from = serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Ana",
            "last_name": "Lima",
        });
        if let Some(uname) = username {
            from["username"] = uname.into();
        }

        serde_json::from_value(serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {"id": user_id as i64, "type": "private", "first_name": "Ana"},
            "from": from,
            "text": text,
        }))
        .expect("failed to deserialize mock message")
    }

    fn make_group_message(user_id: u64, text: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": -100123i64, "type": "supergroup", "title": "Grupo"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Ana"},
            "text": text,
        }))
        .expect("failed to deserialize mock group message")
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        let msg = make_private_message(12345, None, "oi");
        assert!(is_authorized(&msg, &[]));
    }

    #[test]
    fn allow_list_matches_id_or_username() {
        let msg = make_private_message(12345, Some("AnaLima"), "oi");
        assert!(is_authorized(&msg, &["12345".into()]));
        assert!(is_authorized(&msg, &["@analima".into()]));
        assert!(!is_authorized(&msg, &["99999".into()]));
    }

    #[test]
    fn only_private_chats() {
        assert!(is_dm(&make_private_message(1, None, "oi")));
        assert!(!is_dm(&make_group_message(1, "oi")));
    }

    #[test]
    fn blank_text_is_ignored() {
        assert!(extract_text(&make_private_message(1, None, "   ")).is_none());
        assert_eq!(
            extract_text(&make_private_message(1, None, " /start ")).as_deref(),
            Some("/start")
        );
    }

    #[test]
    fn to_inbound_message_maps_fields() {
        let msg = make_private_message(12345, Some("analima"), "quero o flash");
        let inbound = to_inbound_message(&msg, "quero o flash".into());

        assert_eq!(inbound.id, "7");
        assert_eq!(inbound.channel, "telegram");
        assert_eq!(inbound.sender_id, "12345");
        assert_eq!(inbound.display_name.as_deref(), Some("Ana Lima"));
        assert_eq!(inbound.contact_handle.as_deref(), Some("@analima"));

        let meta: serde_json::Value =
            serde_json::from_str(inbound.metadata.as_ref().unwrap()).unwrap();
        assert_eq!(meta["chat_id"], "12345");
    }
}
