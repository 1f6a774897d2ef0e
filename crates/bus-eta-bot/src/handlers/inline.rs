//! Inline mode.

use crate::bot::BusEtaBot;
use async_trait::async_trait;
use bot_dispatch::{ChosenInlineResultNotice, Handler, HandlerResult, InlineQueryRequest};
use telegram_client::EditTarget;
use tracing::{info, warn};

/// Answers search-as-you-type queries with matching bus stops.
pub struct InlineQueryHandler;

#[async_trait]
impl Handler<BusEtaBot, InlineQueryRequest> for InlineQueryHandler {
    async fn handle(&self, bot: &BusEtaBot, query: &InlineQueryRequest) -> HandlerResult {
        match bot.inline_query_answer(&query.query, query.location)? {
            Some(answer) => {
                bot.telegram.answer_inline_query(&query.id, &answer).await?;
            }
            None => info!(query = %query.query, "Inline query returned no results"),
        }
        Ok(())
    }
}

/// Replaces the placeholder text of a chosen result with ETAs.
pub struct ChosenInlineResultHandler;

#[async_trait]
impl Handler<BusEtaBot, ChosenInlineResultNotice> for ChosenInlineResultHandler {
    async fn handle(&self, bot: &BusEtaBot, chosen: &ChosenInlineResultNotice) -> HandlerResult {
        let Some(inline_message_id) = &chosen.inline_message_id else {
            warn!("Received a chosen inline result without inline_message_id");
            return Ok(());
        };

        let message = bot.inline_eta_message(&chosen.result_id, &[]).await?;
        bot.telegram
            .edit_message_text(&EditTarget::Inline(inline_message_id.clone()), &message)
            .await?;
        Ok(())
    }
}
