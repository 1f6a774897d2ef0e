//! Bus Eta Bot - Main entry point.

use anyhow::Context;
use bot_dispatch::Dispatcher;
use bus_eta_bot::{
    handlers, runner, AppResult, BotSettings, BusEtaBot, Config, DatamallEtas, Mode,
};
use bus_stop_store::BusStopStore;
use datamall_client::DatamallClient;
use std::sync::Arc;
use telegram_client::{TelegramClient, UpdateReceiver};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.bot.log_level);

    info!("Starting Bus Eta Bot...");

    let telegram = TelegramClient::new(
        &config.telegram.token,
        &config.telegram.api_url,
        config.telegram.timeout,
    )?;

    let datamall = DatamallClient::new(
        &config.datamall.account_key,
        &config.datamall.base_url,
        config.datamall.timeout,
    )?;

    let bus_stops = BusStopStore::load(&config.bus_stops.path).await?;
    info!(
        "Loaded {} bus stops from {}",
        bus_stops.len(),
        config.bus_stops.path.display()
    );

    match telegram.get_me().await {
        Ok(me) => info!(
            "Telegram API healthy - @{}",
            me.username.as_deref().unwrap_or("unknown")
        ),
        Err(e) => {
            error!("Telegram API not reachable: {}", e);
            return Err(e.into());
        }
    }

    let bot = BusEtaBot::new(
        telegram.clone(),
        Arc::new(DatamallEtas::new(datamall, config.datamall.max_retries)),
        bus_stops,
        BotSettings::from(&config.bot),
    );

    let registry = handlers::registry();
    info!(
        "Registered {} handlers on {} routes",
        registry.handler_count(),
        registry.routes().len()
    );

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(bot), registry));

    match config.bot.mode {
        Mode::Polling => {
            let receiver = UpdateReceiver::new(telegram, config.telegram.poll_timeout);
            runner::run_polling(dispatcher, receiver).await;
        }
        Mode::Webhook => {
            runner::run_webhook(dispatcher, &config.webhook).await?;
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
