//! Attesta — student attestation backend.
//!
//! One process, one tokio runtime, four long-lived tasks: the HTTP
//! gateway, the Telegram bot dispatcher, the notification worker, and
//! the daily reminder scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use attesta_bot::BotDispatcher;
use attesta_channels::TelegramChannel;
use attesta_core::AttestaConfig;
use attesta_db::Store;
use attesta_gateway::AppState;
use attesta_notify::{notify_channel, run_worker, Notifier, ReminderScheduler};

#[derive(Parser)]
#[command(
    name = "attesta",
    version,
    about = "🎓 Attesta — student attestation backend"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "attesta.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug,hyper=info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = if cli.config.exists() {
        AttestaConfig::load_from(&cli.config)?
    } else {
        tracing::warn!(
            "config file {} not found, using defaults + environment",
            cli.config.display()
        );
        let mut config = AttestaConfig::default();
        config.apply_env();
        config
    };
    if config.database_url.is_empty() {
        anyhow::bail!("database_url is not set (config file or DATABASE_URL)");
    }

    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;

    // Outbound transport + notification pipeline.
    let channel = TelegramChannel::new(&config.bot.token, config.bot.poll_interval);
    match channel.get_me().await {
        Ok(me) => tracing::info!(
            "telegram bot: @{}",
            me.username.as_deref().unwrap_or("unknown")
        ),
        Err(e) => tracing::warn!("telegram bot unreachable at startup: {e}"),
    }
    let send_delay = Duration::from_secs(config.reminders.send_delay_secs);
    let notifier = Notifier::new(Arc::new(channel.clone()), send_delay);

    let (notify_tx, notify_rx) = notify_channel();
    let worker_task = tokio::spawn(run_worker(store.clone(), notifier.clone(), notify_rx));

    let scheduler = ReminderScheduler::new(
        store.clone(),
        notifier,
        config.reminders.cron.clone(),
        config.reminders.offsets_days.clone(),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    // Bot dispatcher consumes its own polling stream; replies go out
    // through a second channel handle.
    let conversation_ttl = Duration::from_secs(config.bot.conversation_ttl_minutes * 60);
    let updates = channel.clone().start_polling();
    let dispatcher = BotDispatcher::new(channel, store.clone(), conversation_ttl);
    let bot_task = tokio::spawn(dispatcher.run(updates));

    let state = Arc::new(AppState {
        store,
        notify: notify_tx,
        auth: config.auth.clone(),
    });

    tokio::select! {
        result = attesta_gateway::start(state, &config.gateway.host, config.gateway.port) => {
            if let Err(e) = result {
                tracing::error!("gateway exited: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    scheduler_task.abort();
    bot_task.abort();
    worker_task.abort();
    tracing::info!("attesta stopped");
    Ok(())
}
