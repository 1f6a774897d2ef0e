//! Plain messages.

use super::{in_reply_to, ETA_PROMPT};
use crate::bot::BusEtaBot;
use crate::format::{self, FETCHING_ETAS};
use crate::query::infer_eta_query;
use async_trait::async_trait;
use bot_dispatch::{Handler, HandlerResult, MessageEnvelope};
use telegram_client::OutgoingTextMessage;
use tracing::{debug, info};

/// Treats text containing a bus stop code as an ETA request.
pub struct EtaTextMessage;

#[async_trait]
impl Handler<BusEtaBot, MessageEnvelope> for EtaTextMessage {
    async fn handle(&self, bot: &BusEtaBot, envelope: &MessageEnvelope) -> HandlerResult {
        let MessageEnvelope::Text(message) = envelope else {
            return Ok(());
        };

        // Sent on the user's behalf when they pick an inline result.
        if message.text.contains(FETCHING_ETAS) {
            return Ok(());
        }

        let continuation = message
            .reply_to()
            .and_then(|original| original.text.as_deref())
            == Some(ETA_PROMPT);

        let Some(query) = infer_eta_query(&message.text) else {
            if continuation {
                let reply =
                    OutgoingTextMessage::new("Oops, a bus stop code should be a 5-digit number.");
                bot.telegram
                    .send_message(message.chat_id, &in_reply_to(reply, message))
                    .await?;
            } else {
                debug!("Ignoring text without a bus stop code");
            }
            return Ok(());
        };

        info!(bus_stop = %query.bus_stop, continuation, "ETA text message");
        let reply = bot.eta_message(&query.bus_stop, &query.services).await?;
        bot.telegram
            .send_message(message.chat_id, &in_reply_to(reply, message))
            .await?;
        Ok(())
    }
}

/// Lists bus stops around a shared location or venue.
pub struct NearbyStopsMessage;

#[async_trait]
impl Handler<BusEtaBot, MessageEnvelope> for NearbyStopsMessage {
    async fn handle(&self, bot: &BusEtaBot, envelope: &MessageEnvelope) -> HandlerResult {
        let Some(location) = envelope.location() else {
            return Ok(());
        };
        let message = envelope.message();

        let nearby = bot.nearby(location, bot.settings.nearby_limit);
        info!(found = nearby.len(), "Nearby stops requested");

        let reply = if nearby.is_empty() {
            OutgoingTextMessage::new(format::no_nearby_stops(bot.settings.nearby_radius))
        } else {
            OutgoingTextMessage::new(format::nearby_text(&nearby))
                .markdown()
                .reply_markup(format::nearby_markup(&nearby)?)
        };

        bot.telegram
            .send_message(message.chat_id, &in_reply_to(reply, message))
            .await?;
        Ok(())
    }
}
