// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `autovenda serve` command implementation.
//!
//! Opens the store, loads skills, wires the Gemini provider, the Stripe
//! broker and the Telegram channel into the agent loop, and runs the
//! webhook gateway beside it until SIGINT/SIGTERM.

use std::path::Path;
use std::sync::Arc;

use autovenda_agent::{shutdown, AgentLoop, Orchestrator};
use autovenda_billing::{PaymentSessionBroker, StripeGateway, SubscriptionGate};
use autovenda_config::model::AutovendaConfig;
use autovenda_core::{AutovendaError, ChannelAdapter, PluginAdapter, StorageAdapter};
use autovenda_gateway::GatewayState;
use autovenda_gemini::GeminiProvider;
use autovenda_skill::{HookContext, SkillRegistry};
use autovenda_storage::{HistoryStore, SqliteStorage};
use autovenda_telegram::TelegramChannel;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Pending unlock notices between the webhook gateway and the agent loop.
const NOTICE_CAPACITY: usize = 64;

/// Opens and migrates the store. The only fatal storage condition.
pub async fn open_storage(config: &AutovendaConfig) -> Result<Arc<SqliteStorage>, AutovendaError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Loads the registry, logging every rejected definition.
pub fn load_registry(dir: &Path) -> SkillRegistry {
    let (registry, errors) = SkillRegistry::load(dir);
    for err in &errors {
        warn!(error = %err, "skill definition skipped");
    }
    info!(dir = %dir.display(), skills = registry.len(), "skill registry loaded");
    registry
}

pub async fn run_serve(config: AutovendaConfig) -> Result<(), AutovendaError> {
    info!(persona = %config.agent.name, "starting autovenda serve");

    let storage = open_storage(&config).await?;
    let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();

    let registry = Arc::new(load_registry(Path::new(&config.skills.directory)));
    if registry.is_empty() {
        warn!("no skills loaded, every turn will be model-only");
    }

    let provider = Arc::new(GeminiProvider::new(&config.gemini)?);

    let stripe = StripeGateway::new(&config.stripe)?;
    if let Ok(status) = stripe.health_check().await {
        info!(status = ?status, "stripe gateway ready");
    }
    let (notice_tx, notice_rx) = mpsc::channel(NOTICE_CAPACITY);
    let broker = Arc::new(
        PaymentSessionBroker::new(
            Arc::new(stripe),
            SubscriptionGate::new(storage_dyn.clone()),
            config.stripe.prices.clone(),
        )
        .with_notices(notice_tx),
    );

    let hooks = HookContext {
        storage: storage_dyn.clone(),
        broker: broker.clone(),
        persona: config.agent.name.clone(),
    };
    let history = HistoryStore::new(storage_dyn.clone(), config.agent.history_window);
    let orchestrator = Arc::new(Orchestrator::new(
        history,
        registry,
        provider,
        hooks,
        config.agent.clone(),
    ));

    let mut telegram = TelegramChannel::new(config.telegram.clone())?;
    telegram.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let cancel = shutdown::install_signal_handler();

    let gateway = if config.gateway.enabled {
        let state = GatewayState::new(broker.clone(), storage_dyn.clone(), &config.agent.name);
        let gateway_config = config.gateway.clone();
        let cancel = cancel.clone();
        Some(tokio::spawn(async move {
            autovenda_gateway::start_server(&gateway_config, state, cancel).await
        }))
    } else {
        info!("gateway disabled, payment webhooks will not be received");
        None
    };

    let mut agent = AgentLoop::new(channel.clone(), orchestrator).with_notices(notice_rx);
    let result = agent.run(cancel.clone()).await;

    // The loop also ends when the channel closes; stop the gateway too.
    cancel.cancel();
    if let Some(handle) = gateway {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "gateway exited with error"),
            Err(e) => error!(error = %e, "gateway task panicked"),
        }
    }

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }

    info!("autovenda stopped");
    result
}
