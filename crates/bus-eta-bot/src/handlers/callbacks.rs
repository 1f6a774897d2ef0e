//! Inline keyboard callbacks.

use crate::bot::{is_not_modified, BusEtaBot};
use crate::format::DEMO_BUS_STOP;
use async_trait::async_trait;
use bot_dispatch::{CallbackAction, Handler, HandlerResult};
use telegram_client::EditTarget;
use tracing::{debug, warn};

/// Re-renders an ETA message in place.
pub struct RefreshEta;

#[async_trait]
impl Handler<BusEtaBot, CallbackAction> for RefreshEta {
    async fn handle(&self, bot: &BusEtaBot, action: &CallbackAction) -> HandlerResult {
        let (Some(bus_stop), Some(target)) = (&action.payload.bus_stop, action.edit_target())
        else {
            warn!(data = %action.data, "Refresh without a bus stop or message");
            bot.telegram.answer_callback_query(&action.id, None).await?;
            return Ok(());
        };

        let services = &action.payload.services;
        let message = match &target {
            EditTarget::Inline(_) => bot.inline_eta_message(bus_stop, services).await?,
            EditTarget::Chat { .. } => bot.eta_message(bus_stop, services).await?,
        };

        let (edited, answered) = tokio::join!(
            bot.telegram.edit_message_text(&target, &message),
            bot.telegram
                .answer_callback_query(&action.id, Some("Etas updated!")),
        );
        if let Err(e) = edited {
            if !is_not_modified(&e) {
                return Err(e.into());
            }
            debug!("ETA message unchanged");
        }
        answered?;
        Ok(())
    }
}

/// Sends a fresh ETA message. Behind the Resend button and the nearby stops
/// list.
pub struct NewEta;

#[async_trait]
impl Handler<BusEtaBot, CallbackAction> for NewEta {
    async fn handle(&self, bot: &BusEtaBot, action: &CallbackAction) -> HandlerResult {
        let Some(bus_stop) = &action.payload.bus_stop else {
            warn!(data = %action.data, "New ETA request without a bus stop");
            bot.telegram.answer_callback_query(&action.id, None).await?;
            return Ok(());
        };

        send_eta_message(bot, action, bus_stop, &action.payload.services).await
    }
}

/// Sends ETAs for the demo bus stop from the `/start` keyboard.
pub struct EtaDemo;

#[async_trait]
impl Handler<BusEtaBot, CallbackAction> for EtaDemo {
    async fn handle(&self, bot: &BusEtaBot, action: &CallbackAction) -> HandlerResult {
        send_eta_message(bot, action, DEMO_BUS_STOP, &[]).await
    }
}

async fn send_eta_message(
    bot: &BusEtaBot,
    action: &CallbackAction,
    bus_stop: &str,
    services: &[String],
) -> HandlerResult {
    let Some(chat_id) = action.message.as_ref().map(|m| m.chat_id) else {
        warn!(data = %action.data, "ETA request from a message without a chat");
        bot.telegram.answer_callback_query(&action.id, None).await?;
        return Ok(());
    };

    let message = bot.eta_message(bus_stop, services).await?;

    let (sent, answered) = tokio::join!(
        bot.telegram.send_message(chat_id, &message),
        bot.telegram.answer_callback_query(&action.id, None),
    );
    sent?;
    answered?;
    Ok(())
}
