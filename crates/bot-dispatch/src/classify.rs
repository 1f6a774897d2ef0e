//! Update classification.
//!
//! Commands are checked before plain messages since every command update
//! also carries a message. The remaining kinds are distinguished by which
//! payload field is present.

use crate::envelope::CallbackData;
use serde::{Deserialize, Serialize};
use std::fmt;
use telegram_client::{Message, Update};

/// Content kind of a non-command message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Photo,
    Voice,
    Location,
    Venue,
    /// Anything not matched above.
    Other,
}

impl MessageKind {
    /// Detect the content kind, testing fields in a fixed order.
    pub fn of(message: &Message) -> Self {
        if message.text.is_some() {
            MessageKind::Text
        } else if message.photo.is_some() {
            MessageKind::Photo
        } else if message.voice.is_some() {
            MessageKind::Voice
        } else if message.location.is_some() {
            MessageKind::Location
        } else if message.venue.is_some() {
            MessageKind::Venue
        } else {
            MessageKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Photo => "photo",
            MessageKind::Voice => "voice",
            MessageKind::Location => "location",
            MessageKind::Venue => "venue",
            MessageKind::Other => "other",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an update is, plus the routing key where one applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Command { name: String, args: String },
    Message(MessageKind),
    /// `tag` is `None` when the callback data is not structured data with
    /// a non-empty `t` field.
    CallbackAction { tag: Option<String> },
    InlineQuery,
    ChosenInlineResult,
    Unrecognized,
}

/// Classify an update.
pub fn classify(update: &Update) -> UpdateKind {
    if let Some(message) = &update.message {
        if let Some((name, args)) = parse_command(message) {
            return UpdateKind::Command { name, args };
        }
        return UpdateKind::Message(MessageKind::of(message));
    }

    if let Some(query) = &update.callback_query {
        let tag = query.data.as_deref().and_then(callback_action_tag);
        return UpdateKind::CallbackAction { tag };
    }

    if update.inline_query.is_some() {
        return UpdateKind::InlineQuery;
    }

    if update.chosen_inline_result.is_some() {
        return UpdateKind::ChosenInlineResult;
    }

    UpdateKind::Unrecognized
}

/// Extract `(command, args)` from a message with a bot-command entity.
///
/// The command is the entity span with any `@BotName` suffix and the
/// leading marker removed. The args are the text after the span with
/// whitespace runs collapsed and the ends trimmed.
pub fn parse_command(message: &Message) -> Option<(String, String)> {
    let text = message.text.as_deref()?;
    let entity = message.command_entity()?;

    let units: Vec<u16> = text.encode_utf16().collect();
    let start = entity.offset.min(units.len());
    let end = entity.offset.saturating_add(entity.length).min(units.len());

    let token = String::from_utf16_lossy(&units[start..end]);
    let rest = String::from_utf16_lossy(&units[end..]);

    let addressed = token.split('@').next().unwrap_or_default();
    let mut chars = addressed.chars();
    chars.next();
    let name = chars.as_str().to_string();

    let args = rest.split_whitespace().collect::<Vec<_>>().join(" ");

    Some((name, args))
}

/// Read the action tag from opaque callback data.
///
/// The whole payload must parse as [`CallbackData`], so a routed action
/// always carries the payload its handler reads.
pub fn callback_action_tag(data: &str) -> Option<String> {
    CallbackData::parse(data)
        .map(|payload| payload.action)
        .filter(|action| !action.is_empty())
}
