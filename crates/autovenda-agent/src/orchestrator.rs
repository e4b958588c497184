// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestrator: one inbound message in, one reply out.
//!
//! Loads the history window, matches a skill, runs its hook, asks the model
//! for free text and merges the two. Every failure below this boundary
//! degrades to a reply; nothing propagates to the messaging transport.

use std::sync::Arc;

use autovenda_config::model::AgentConfig;
use autovenda_core::types::{GenerateRequest, HistoryEntry, InboundMessage, Role};
use autovenda_core::{AutovendaError, ProviderAdapter};
use autovenda_skill::{
    match_skill, FailureKind, HookContext, HookData, HookInput, HookOutcome, SkillRegistry,
};
use autovenda_storage::HistoryStore;
use tracing::{debug, error, info, warn};

use crate::prompt::{base_system_prompt, build_system_prompt};
use crate::reply::{merge, render_outcome};

/// Command that opens a conversation.
pub const START_COMMAND: &str = "/start";

/// Sent after payment confirmation, inviting the customer to onboarding.
pub const UNLOCK_NOTICE: &str = "🎉 Pagamento confirmado! Sua assinatura está ativa. \
    Para configurar sua automação, me envie seu WhatsApp com DDD, o endereço do seu site \
    e seus principais objetivos.";

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub reply: String,
    /// Name of the matched skill, if any.
    pub skill: Option<String>,
    pub outcome: Option<HookOutcome>,
}

impl TurnOutput {
    /// No reply at all; the transport sends nothing.
    fn silent() -> Self {
        Self {
            reply: String::new(),
            skill: None,
            outcome: None,
        }
    }
}

pub struct Orchestrator {
    history: HistoryStore,
    registry: Arc<SkillRegistry>,
    provider: Arc<dyn ProviderAdapter>,
    hooks: HookContext,
    config: AgentConfig,
    base_prompt: String,
}

impl Orchestrator {
    pub fn new(
        history: HistoryStore,
        registry: Arc<SkillRegistry>,
        provider: Arc<dyn ProviderAdapter>,
        hooks: HookContext,
        config: AgentConfig,
    ) -> Self {
        let base_prompt = base_system_prompt(&config);
        Self {
            history,
            registry,
            provider,
            hooks,
            config,
            base_prompt,
        }
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    /// Handles one inbound message. Never fails: errors become replies.
    pub async fn handle_turn(&self, msg: &InboundMessage) -> TurnOutput {
        let user_id = msg.sender_id.as_str();

        if let Err(e) = self
            .hooks
            .storage
            .upsert_user(user_id, msg.display_name.as_deref(), msg.contact_handle.as_deref())
            .await
        {
            warn!(user_id, error = %e, "failed to upsert user");
        }

        if is_start_command(&msg.text) {
            info!(user_id, "conversation started");
            return TurnOutput {
                reply: self.config.greeting.clone(),
                skill: None,
                outcome: None,
            };
        }

        match classify_bare_input(&msg.text) {
            Some(BareInput::Empty) => {
                debug!(user_id, "ignoring empty message");
                return TurnOutput::silent();
            }
            Some(BareInput::Command(command)) => {
                debug!(user_id, command, "unhandled command, replying with greeting");
                return TurnOutput {
                    reply: self.config.greeting.clone(),
                    skill: None,
                    outcome: None,
                };
            }
            None => {}
        }

        let history = match self.history.recent_window(user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id, error = %e, "history unavailable, continuing without it");
                Vec::new()
            }
        };

        let skill = match_skill(&self.registry, &msg.text, &history);
        let skill_name = skill.map(|s| s.name.clone());
        debug!(user_id, skill = ?skill_name, "skill matched");

        let outcome = match skill.and_then(|s| s.hook) {
            Some(hook) => {
                let input = HookInput::new(user_id, &msg.text, &history);
                hook.run(&self.hooks, &input).await
            }
            None => None,
        };
        if let Some(outcome) = &outcome {
            debug!(user_id, skill = ?skill_name, outcome = ?outcome, "hook finished");
        }

        let reply = match &outcome {
            // Brand notices replace the model entirely.
            Some(HookOutcome::Complete(HookData::Notice { text })) => text.clone(),
            Some(HookOutcome::Error(failure)) if failure.kind == FailureKind::Internal => {
                let err = AutovendaError::Hook {
                    hook: skill_name.clone().unwrap_or_default(),
                    message: failure.message.clone(),
                };
                error!(user_id, error = %err, "hook failed");
                self.config.fallback_reply.clone()
            }
            _ => {
                let request = GenerateRequest {
                    system_prompt: build_system_prompt(&self.base_prompt, skill),
                    history: history.clone(),
                    user_text: msg.text.clone(),
                };
                let model_text = match self.provider.generate(request).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(user_id, error = %e, "model reply failed");
                        None
                    }
                };
                let hook_text = outcome.as_ref().and_then(render_outcome);
                merge(model_text.as_deref(), hook_text.as_deref())
                    .unwrap_or_else(|| self.config.fallback_reply.clone())
            }
        };

        self.record(user_id, Role::User, &msg.text).await;
        self.record(user_id, Role::Assistant, &reply).await;

        TurnOutput {
            reply,
            skill: skill_name,
            outcome,
        }
    }

    /// Message sent once when a subscription becomes active.
    pub async fn unlock_notice(&self, user_id: &str) -> String {
        let text = UNLOCK_NOTICE.to_string();
        self.record(user_id, Role::Assistant, &text).await;
        text
    }

    async fn record(&self, user_id: &str, role: Role, content: &str) {
        if let Err(e) = self.history.append(user_id, role, content).await {
            warn!(user_id, role = %role, error = %e, "failed to append history");
        }
    }

    /// Oldest-first recent window, for inspection.
    pub async fn recent(&self, user_id: &str) -> Result<Vec<HistoryEntry>, AutovendaError> {
        self.history.recent_window(user_id).await
    }
}

pub fn is_start_command(text: &str) -> bool {
    let text = text.trim();
    text == START_COMMAND || text.starts_with("/start ") || text.starts_with("/start@")
}

/// Input that never reaches the skill matcher.
#[derive(Debug, PartialEq, Eq)]
pub enum BareInput<'a> {
    Empty,
    /// A single `/command` token, bot suffix included.
    Command(&'a str),
}

pub fn classify_bare_input(text: &str) -> Option<BareInput<'_>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(BareInput::Empty);
    }
    let is_command = text.len() > 1
        && text.starts_with('/')
        && !text.contains(char::is_whitespace)
        && text[1..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
    is_command.then_some(BareInput::Command(text))
}
