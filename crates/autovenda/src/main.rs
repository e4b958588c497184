// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-Venda: a sales agent that qualifies leads, sells plans and
//! onboards customers over Telegram.
//!
//! This is the binary entry point.

mod admin;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Auto-Venda sales agent.
#[derive(Parser, Debug)]
#[command(name = "autovenda", version, about, long_about = None)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot and the webhook gateway.
    Serve,
    /// Load the skill definitions and list them.
    Skills {
        /// Skills directory (defaults to `skills.directory`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List every subscription row.
    Leads,
    /// Print a user's recent conversation.
    History {
        user_id: String,
        /// Number of entries (defaults to `agent.history_window`).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Administrative subscription commands.
    Subscription {
        #[command(subcommand)]
        action: SubscriptionCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SubscriptionCommand {
    /// Move a subscription back to `lead`.
    Reset { user_id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match autovenda_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            autovenda_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Skills { dir }) => admin::run_skills(&config, dir, cli.plain),
        Some(Commands::Leads) => admin::run_leads(&config, cli.plain).await,
        Some(Commands::History { user_id, limit }) => {
            admin::run_history(&config, &user_id, limit).await
        }
        Some(Commands::Subscription {
            action: SubscriptionCommand::Reset { user_id },
        }) => admin::run_reset(&config, &user_id).await,
        None => {
            println!("autovenda: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `autovenda={log_level},warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("autovenda={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
