//! Update sources feeding the dispatcher.

use crate::bot::BusEtaBot;
use crate::config::WebhookConfig;
use crate::webhook;
use bot_dispatch::{Dispatcher, Outcome};
use std::net::SocketAddr;
use std::sync::Arc;
use telegram_client::{Update, UpdateReceiver};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

/// Dispatch one update and log the result.
///
/// Handler failures are logged and reported to the user, then swallowed so
/// that one bad update never stops the update source.
pub async fn dispatch_logged(dispatcher: &Dispatcher<BusEtaBot>, update: &Update) {
    match dispatcher.handle(update).await {
        Ok(Outcome::Handled { route, handlers }) => {
            debug!(update_id = update.update_id, handlers, "Handled {}", route);
        }
        Ok(Outcome::Unrouted(_)) => {}
        Err(e) => {
            error!(update_id = update.update_id, "Handler error: {:#}", e);
            dispatcher.bot().report_failure(update).await;
        }
    }
}

/// Long-poll `getUpdates` until ctrl-c.
///
/// Each update is dispatched on its own task.
pub async fn run_polling(dispatcher: Arc<Dispatcher<BusEtaBot>>, receiver: UpdateReceiver) {
    info!("Polling for updates...");
    let mut stream = Box::pin(receiver.stream());

    loop {
        tokio::select! {
            Some(update) = stream.next() => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    dispatch_logged(&dispatcher, &update).await;
                });
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
}

/// Serve the webhook endpoint until ctrl-c.
pub async fn run_webhook(
    dispatcher: Arc<Dispatcher<BusEtaBot>>,
    config: &WebhookConfig,
) -> std::io::Result<()> {
    let app = webhook::create_router(dispatcher, &config.path);
    let addr = SocketAddr::new(config.listen_addr, config.port);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening for webhook updates on {}{}", addr, config.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
