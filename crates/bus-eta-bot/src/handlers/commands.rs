//! Slash commands.

use super::{in_reply_to, ETA_PROMPT};
use crate::bot::BusEtaBot;
use crate::format;
use crate::query::infer_eta_query;
use async_trait::async_trait;
use bot_dispatch::{CommandMessage, Handler, HandlerResult};
use telegram_client::{InlineKeyboardButton, InlineKeyboardMarkup, OutgoingTextMessage};
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct StartCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for StartCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        let text = format!(
            "Hello {},\n\n\
             Bus Eta Bot is a Telegram bot which can tell you how long you have to wait for \
             your bus to arrive.\n\n\
             To get started, try sending me a bus stop code such as `96049` to get etas for.\n\n\
             Alternatively, you can also search for bus stops by sending me an inline query. \
             To try this out, type my username followed by a bus stop code, description or \
             road name in any chat.\n\n\
             If you're stuck, you can send /help to view help.\n\n\
             Thanks for trying out Bus Eta Bot! If you find Bus Eta Bot useful, do help to \
             spread the word or send /feedback to leave some feedback about how to help make \
             Bus Eta Bot even better!",
            cmd.first_name()
        );

        let keyboard = InlineKeyboardMarkup::new(vec![
            vec![format::demo_button()?],
            vec![InlineKeyboardButton {
                text: "Try an inline query".into(),
                callback_data: None,
                url: None,
                switch_inline_query_current_chat: Some("Changi".into()),
            }],
        ]);
        let reply = OutgoingTextMessage::new(text)
            .markdown()
            .reply_markup(keyboard);

        bot.telegram.send_message(cmd.chat_id, &reply).await?;
        Ok(())
    }
}

pub struct HelpCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for HelpCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        let text = "*Getting etas*\n\
             Send a bus stop code such as `96049`, optionally followed by service numbers \
             (`96049 2 24`) to only show those services. /eta works the same way.\n\n\
             *Searching for bus stops*\n\
             Type my username in any chat followed by a bus stop code, description or road \
             name. Send a location to see the bus stops around it.\n\n\
             *Refreshing*\n\
             Press Refresh under an eta message to update it, or Resend to get a new one \
             at the bottom of the chat.\n\n\
             *Other commands*\n\
             /about - show the bot version\n\
             /feedback - tell us how to make the bot better\n\
             /privacy - what happens to your messages";

        let reply = in_reply_to(OutgoingTextMessage::new(text).markdown(), cmd);
        bot.telegram.send_message(cmd.chat_id, &reply).await?;
        Ok(())
    }
}

/// Handles `/about` and `/version`.
pub struct AboutCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for AboutCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        let reply = in_reply_to(
            OutgoingTextMessage::new(format!("Bus Eta Bot {}", VERSION)),
            cmd,
        );
        bot.telegram.send_message(cmd.chat_id, &reply).await?;
        Ok(())
    }
}

pub struct PrivacyCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for PrivacyCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        let text = "Bus Eta Bot does not store your messages. Bus stop codes you send are \
             passed to the LTA DataMall API to look up arrival times, and locations you share \
             are only used to find nearby bus stops.";

        let reply = in_reply_to(OutgoingTextMessage::new(text), cmd);
        bot.telegram.send_message(cmd.chat_id, &reply).await?;
        Ok(())
    }
}

pub struct FeedbackCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for FeedbackCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        let mut text = String::from("Oops, the feedback command has not been implemented yet.");
        if let Some(url) = &bot.settings.feedback_url {
            text.push_str(&format!(
                " In the meantime, you can raise issues or show your support for Bus Eta Bot \
                 [here]({}).",
                url
            ));
        }

        let reply = in_reply_to(OutgoingTextMessage::new(text).markdown(), cmd);
        bot.telegram.send_message(cmd.chat_id, &reply).await?;
        Ok(())
    }
}

/// `/eta <code> [services...]`. Without arguments, prompts for a code.
pub struct EtaCommand;

#[async_trait]
impl Handler<BusEtaBot, CommandMessage> for EtaCommand {
    async fn handle(&self, bot: &BusEtaBot, cmd: &CommandMessage) -> HandlerResult {
        if cmd.args.is_empty() {
            let prompt = OutgoingTextMessage::new(ETA_PROMPT)
                .reply_to(cmd.message_id)
                .force_reply();
            bot.telegram.send_message(cmd.chat_id, &prompt).await?;
            return Ok(());
        }

        let reply = match infer_eta_query(&cmd.args) {
            Some(query) => {
                info!(bus_stop = %query.bus_stop, "ETA command");
                bot.eta_message(&query.bus_stop, &query.services).await?
            }
            None => OutgoingTextMessage::new("Oops, that did not seem to be a valid bus stop code."),
        };

        bot.telegram
            .send_message(cmd.chat_id, &in_reply_to(reply, cmd))
            .await?;
        Ok(())
    }
}
