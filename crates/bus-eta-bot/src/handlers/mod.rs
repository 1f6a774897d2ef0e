//! Update handlers and their registration.

mod callbacks;
mod commands;
mod inline;
mod messages;

pub use callbacks::{EtaDemo, NewEta, RefreshEta};
pub use commands::{
    AboutCommand, EtaCommand, FeedbackCommand, HelpCommand, PrivacyCommand, StartCommand,
};
pub use inline::{ChosenInlineResultHandler, InlineQueryHandler};
pub use messages::{EtaTextMessage, NearbyStopsMessage};

use crate::bot::BusEtaBot;
use crate::format::{ETA_ACTION, ETA_DEMO_ACTION, NEW_ETA_ACTION, RESEND_ACTION};
use bot_dispatch::{IncomingMessage, MessageKind, Registry};
use telegram_client::OutgoingTextMessage;

/// Prompt sent by `/eta` without arguments. Replies to it are treated as
/// bus stop codes.
pub const ETA_PROMPT: &str = "Alright, send me a bus stop code to get etas for.";

/// Build the registry for Bus Eta Bot.
pub fn registry() -> Registry<BusEtaBot> {
    let mut registry = Registry::new();
    register(&mut registry);
    registry
}

/// Register every handler.
pub fn register(registry: &mut Registry<BusEtaBot>) {
    registry
        .register_command("start", StartCommand)
        .register_command("help", HelpCommand)
        .register_command("about", AboutCommand)
        .register_command("version", AboutCommand)
        .register_command("privacy", PrivacyCommand)
        .register_command("feedback", FeedbackCommand)
        .register_command("eta", EtaCommand)
        .register_message(MessageKind::Text, EtaTextMessage)
        .register_message(MessageKind::Location, NearbyStopsMessage)
        // Telegram venues carry a location and classify as Location first, so
        // this only sees venues without one.
        .register_message(MessageKind::Venue, NearbyStopsMessage)
        .register_callback_action(ETA_ACTION, RefreshEta)
        .register_callback_action(NEW_ETA_ACTION, NewEta)
        .register_callback_action(RESEND_ACTION, NewEta)
        .register_callback_action(ETA_DEMO_ACTION, EtaDemo)
        .register_inline_query(InlineQueryHandler)
        .register_chosen_inline_result(ChosenInlineResultHandler);
}

/// In groups, thread the reply under the triggering message.
fn in_reply_to(reply: OutgoingTextMessage, message: &IncomingMessage) -> OutgoingTextMessage {
    if message.is_private() {
        reply
    } else {
        reply.reply_to(message.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_dispatch::Route;

    #[test]
    fn test_registry_routes() {
        let registry = registry();

        assert_eq!(registry.handler_count(), 16);
        assert!(registry.routes().contains(&Route::Command("version".into())));
        assert!(registry.routes().contains(&Route::Command("feedback".into())));
        assert!(registry.routes().contains(&Route::CallbackAction("new_eta".into())));
        assert!(registry.routes().contains(&Route::CallbackAction("resend".into())));
        assert!(registry.routes().contains(&Route::CallbackAction("eta_demo".into())));
        assert_eq!(
            registry.message_handlers(MessageKind::Other).map(<[_]>::len),
            Some(0)
        );
        assert!(registry.message_handlers(MessageKind::Photo).is_none());
    }
}
