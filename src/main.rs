#![forbid(unsafe_code)]

//! `habit-coach` — Slack habit check-in bot binary.
//!
//! Bootstraps configuration and credentials, starts the Slack Socket
//! Mode listener and the daily check-in scheduler, then waits for a
//! shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use habit_coach::chat::DirectMessenger;
use habit_coach::config::GlobalConfig;
use habit_coach::note::NoteClient;
use habit_coach::router::AppState;
use habit_coach::scheduler::CheckInScheduler;
use habit_coach::slack::client::SlackService;
use habit_coach::state::ConversationSlot;
use habit_coach::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "habit-coach", about = "Slack habit check-in bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("habit-coach bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration and credentials ──────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Build the note client and Slack service ─────────
    let notes = Arc::new(NoteClient::new(&config.note)?);
    let slack = Arc::new(SlackService::new(&config.slack)?);

    // ── Shared application state ────────────────────────
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        slot: ConversationSlot::default(),
        messenger: Arc::clone(&slack) as Arc<dyn DirectMessenger>,
        notes,
    });

    // ── Start the Socket Mode listener and scheduler ────
    let socket_task = slack.spawn_socket_mode(Arc::clone(&state));
    let mut scheduler = CheckInScheduler::start(Arc::clone(&state)).await?;
    info!("habit-coach ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");

    if let Err(err) = scheduler.shutdown().await {
        error!(%err, "error stopping scheduler");
    }
    socket_task.abort();
    info!("habit-coach shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
