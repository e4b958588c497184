// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop and conversation orchestration for the Auto-Venda sales agent.
//!
//! The [`AgentLoop`]:
//! - receives messages from a channel adapter
//! - runs one task per message, serialized per user
//! - delivers activation notices from the payment broker
//! - drains in-flight turns on shutdown

pub mod orchestrator;
pub mod prompt;
pub mod reply;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use autovenda_billing::ActivationNotice;
use autovenda_core::types::{InboundMessage, OutboundMessage};
use autovenda_core::{AutovendaError, ChannelAdapter};
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use orchestrator::{Orchestrator, TurnOutput};

/// How long shutdown waits for in-flight turns.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

type UserLocks = DashMap<String, Arc<Mutex<()>>>;

pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    orchestrator: Arc<Orchestrator>,
    notices: Option<mpsc::Receiver<ActivationNotice>>,
    locks: Arc<UserLocks>,
    tracker: TaskTracker,
}

impl AgentLoop {
    /// `channel` must already be connected.
    pub fn new(channel: Arc<dyn ChannelAdapter>, orchestrator: Arc<Orchestrator>) -> Self {
        info!(skills = orchestrator.registry().len(), "agent loop initialized");
        Self {
            channel,
            orchestrator,
            notices: None,
            locks: Arc::new(DashMap::new()),
            tracker: TaskTracker::new(),
        }
    }

    /// Deliver an unlock message for every notice received on `rx`.
    pub fn with_notices(mut self, rx: mpsc::Receiver<ActivationNotice>) -> Self {
        self.notices = Some(rx);
        self
    }

    /// Runs until `cancel` fires or the channel closes, then drains
    /// in-flight turns.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), AutovendaError> {
        info!("agent loop running");

        loop {
            tokio::select! {
                msg = self.channel.receive() => match msg {
                    Ok(inbound) => self.spawn_turn(inbound),
                    Err(e) => {
                        error!(error = %e, "channel receive error");
                        break;
                    }
                },
                Some(notice) = recv_notice(&mut self.notices) => self.spawn_notice(notice),
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&self.tracker, DRAIN_TIMEOUT).await;
        info!("agent loop stopped");
        Ok(())
    }

    fn spawn_turn(&self, inbound: InboundMessage) {
        let channel = self.channel.clone();
        let orchestrator = self.orchestrator.clone();
        let locks = self.locks.clone();
        let user_id = inbound.sender_id.clone();
        let lock = user_lock(&locks, &user_id);

        self.tracker.spawn(async move {
            {
                let _guard = lock.lock().await;
                handle_inbound(channel.as_ref(), &orchestrator, inbound).await;
            }
            drop(lock);
            release_user_lock(&locks, &user_id);
        });
    }

    fn spawn_notice(&self, notice: ActivationNotice) {
        let channel = self.channel.clone();
        let orchestrator = self.orchestrator.clone();
        let locks = self.locks.clone();
        let lock = user_lock(&locks, &notice.user_id);

        self.tracker.spawn(async move {
            let guard = lock.lock().await;
            let text = orchestrator.unlock_notice(&notice.user_id).await;
            let out = OutboundMessage {
                channel: channel.name().to_string(),
                recipient_id: notice.user_id.clone(),
                content: text,
                metadata: None,
            };
            match channel.send(out).await {
                Ok(_) => info!(user_id = %notice.user_id, "unlock notice delivered"),
                Err(e) => {
                    warn!(user_id = %notice.user_id, error = %e, "failed to deliver unlock notice")
                }
            }
            drop(guard);
            drop(lock);
            release_user_lock(&locks, &notice.user_id);
        });
    }
}

/// Pending forever when no notice channel is configured or it closed.
async fn recv_notice(
    notices: &mut Option<mpsc::Receiver<ActivationNotice>>,
) -> Option<ActivationNotice> {
    match notices {
        Some(rx) => match rx.recv().await {
            Some(notice) => Some(notice),
            None => {
                *notices = None;
                std::future::pending().await
            }
        },
        None => std::future::pending().await,
    }
}

fn user_lock(locks: &UserLocks, user_id: &str) -> Arc<Mutex<()>> {
    locks
        .entry(user_id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Drops the user's lock entry once no queued or running task holds it.
fn release_user_lock(locks: &UserLocks, user_id: &str) {
    locks.remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
}

/// Runs one turn and sends the reply through `channel`.
pub async fn handle_inbound(
    channel: &dyn ChannelAdapter,
    orchestrator: &Orchestrator,
    inbound: InboundMessage,
) {
    let user_id = inbound.sender_id.clone();
    debug!(user_id = %user_id, channel = %inbound.channel, "handling inbound message");

    if channel.capabilities().supports_typing
        && let Err(e) = channel.send_typing(&user_id).await
    {
        debug!(error = %e, "failed to send typing indicator");
    }

    let output = orchestrator.handle_turn(&inbound).await;
    if output.reply.is_empty() {
        return;
    }
    let out = OutboundMessage {
        channel: inbound.channel.clone(),
        recipient_id: user_id.clone(),
        content: output.reply,
        metadata: inbound.metadata.clone(),
    };
    if let Err(e) = channel.send(out).await {
        error!(user_id = %user_id, error = %e, "failed to send reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_user_lock_is_released() {
        let locks = UserLocks::new();
        let lock = user_lock(&locks, "u1");
        assert_eq!(locks.len(), 1);

        drop(lock);
        release_user_lock(&locks, "u1");
        assert!(locks.is_empty());
    }

    #[test]
    fn lock_held_by_queued_turn_survives_release() {
        let locks = UserLocks::new();
        let running = user_lock(&locks, "u1");
        let queued = user_lock(&locks, "u1");
        assert!(Arc::ptr_eq(&running, &queued));

        drop(running);
        release_user_lock(&locks, "u1");
        assert_eq!(locks.len(), 1);

        drop(queued);
        release_user_lock(&locks, "u1");
        assert!(locks.is_empty());
    }
}
