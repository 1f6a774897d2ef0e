//! Typed envelopes handed to handlers.
//!
//! One envelope is built per dispatch from the raw update and shared by
//! every handler in the chain.

use crate::classify::MessageKind;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use telegram_client::{
    CallbackQuery, ChosenInlineResult, EditTarget, InlineQuery, Location, Message, PhotoSize,
    User, Venue, Voice,
};

/// Who sent an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

/// Fields common to every message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub chat_type: String,
    pub date: i64,
    pub sender: Option<Sender>,
    pub raw: Message,
}

impl IncomingMessage {
    pub fn new(message: &Message) -> Self {
        Self {
            message_id: message.message_id,
            chat_id: message.chat.id,
            chat_type: message.chat.chat_type.clone(),
            date: message.date,
            sender: message.from.as_ref().map(Sender::from),
            raw: message.clone(),
        }
    }

    /// Sender's first name, empty for anonymous messages.
    pub fn first_name(&self) -> &str {
        self.sender
            .as_ref()
            .map(|s| s.first_name.as_str())
            .unwrap_or_default()
    }

    pub fn is_private(&self) -> bool {
        self.raw.chat.is_private()
    }

    /// The message this one replies to, if any.
    pub fn reply_to(&self) -> Option<&Message> {
        self.raw.reply_to_message.as_deref()
    }

    /// Target for editing this message.
    pub fn edit_target(&self) -> EditTarget {
        EditTarget::Chat {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

macro_rules! deref_to_message {
    ($($ty:ty),*) => {
        $(
            impl Deref for $ty {
                type Target = IncomingMessage;

                fn deref(&self) -> &IncomingMessage {
                    &self.message
                }
            }
        )*
    };
}

#[derive(Debug, Clone)]
pub struct TextMessage {
    pub message: IncomingMessage,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PhotoMessage {
    pub message: IncomingMessage,
    pub photo: Vec<PhotoSize>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VoiceMessage {
    pub message: IncomingMessage,
    pub voice: Voice,
}

#[derive(Debug, Clone)]
pub struct LocationMessage {
    pub message: IncomingMessage,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct VenueMessage {
    pub message: IncomingMessage,
    pub venue: Venue,
    pub location: Location,
}

deref_to_message!(TextMessage, PhotoMessage, VoiceMessage, LocationMessage, VenueMessage);

impl TextMessage {
    pub fn new(message: &Message) -> Self {
        Self {
            message: IncomingMessage::new(message),
            text: message.text.clone().unwrap_or_default(),
        }
    }
}

/// A non-command message, one variant per [`MessageKind`].
#[derive(Debug, Clone)]
pub enum MessageEnvelope {
    Text(TextMessage),
    Photo(PhotoMessage),
    Voice(VoiceMessage),
    Location(LocationMessage),
    Venue(VenueMessage),
    Other(IncomingMessage),
}

impl MessageEnvelope {
    /// Build the envelope for `kind`. Falls back to `Other` if the field
    /// the kind names is missing.
    pub fn new(kind: MessageKind, message: &Message) -> Self {
        let base = || IncomingMessage::new(message);

        match kind {
            MessageKind::Text => match &message.text {
                Some(text) => MessageEnvelope::Text(TextMessage {
                    message: base(),
                    text: text.clone(),
                }),
                None => MessageEnvelope::Other(base()),
            },
            MessageKind::Photo => match &message.photo {
                Some(photo) => MessageEnvelope::Photo(PhotoMessage {
                    message: base(),
                    photo: photo.clone(),
                    caption: message.caption.clone(),
                }),
                None => MessageEnvelope::Other(base()),
            },
            MessageKind::Voice => match &message.voice {
                Some(voice) => MessageEnvelope::Voice(VoiceMessage {
                    message: base(),
                    voice: voice.clone(),
                }),
                None => MessageEnvelope::Other(base()),
            },
            MessageKind::Location => match message.location {
                Some(location) => MessageEnvelope::Location(LocationMessage {
                    message: base(),
                    location,
                }),
                None => MessageEnvelope::Other(base()),
            },
            MessageKind::Venue => match &message.venue {
                Some(venue) => MessageEnvelope::Venue(VenueMessage {
                    message: base(),
                    location: venue.location,
                    venue: venue.clone(),
                }),
                None => MessageEnvelope::Other(base()),
            },
            MessageKind::Other => MessageEnvelope::Other(base()),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            MessageEnvelope::Text(_) => MessageKind::Text,
            MessageEnvelope::Photo(_) => MessageKind::Photo,
            MessageEnvelope::Voice(_) => MessageKind::Voice,
            MessageEnvelope::Location(_) => MessageKind::Location,
            MessageEnvelope::Venue(_) => MessageKind::Venue,
            MessageEnvelope::Other(_) => MessageKind::Other,
        }
    }

    pub fn message(&self) -> &IncomingMessage {
        match self {
            MessageEnvelope::Text(m) => &m.message,
            MessageEnvelope::Photo(m) => &m.message,
            MessageEnvelope::Voice(m) => &m.message,
            MessageEnvelope::Location(m) => &m.message,
            MessageEnvelope::Venue(m) => &m.message,
            MessageEnvelope::Other(m) => m,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            MessageEnvelope::Text(m) => Some(&m.text),
            _ => None,
        }
    }

    /// Location carried by location and venue messages.
    pub fn location(&self) -> Option<Location> {
        match self {
            MessageEnvelope::Location(m) => Some(m.location),
            MessageEnvelope::Venue(m) => Some(m.location),
            _ => None,
        }
    }
}

/// A command invocation: the text message plus the parsed command and args.
#[derive(Debug, Clone)]
pub struct CommandMessage {
    pub command: String,
    pub args: String,
    pub message: TextMessage,
}

impl Deref for CommandMessage {
    type Target = TextMessage;

    fn deref(&self) -> &TextMessage {
        &self.message
    }
}

/// Structured payload carried in inline keyboard callback data.
///
/// Wire form is compact JSON: `{"t": action, "b": bus stop, "s": [services]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackData {
    #[serde(rename = "t", default)]
    pub action: String,
    #[serde(rename = "b", default, skip_serializing_if = "Option::is_none")]
    pub bus_stop: Option<String>,
    #[serde(rename = "s", default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

impl CallbackData {
    pub fn new(action: impl Into<String>, bus_stop: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            bus_stop: Some(bus_stop.into()),
            services: Vec::new(),
        }
    }

    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.services = services;
        self
    }

    /// Serialize to the string placed in `callback_data`.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse callback data, `None` if it is not a matching JSON object.
    pub fn parse(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }
}

/// A callback action triggered from an inline keyboard.
#[derive(Debug, Clone)]
pub struct CallbackAction {
    pub id: String,
    pub sender: Sender,
    /// Originating chat message; absent when it came from an inline message.
    pub message: Option<IncomingMessage>,
    pub inline_message_id: Option<String>,
    /// Raw callback data.
    pub data: String,
    /// Parsed callback data; default when it does not match the schema.
    pub payload: CallbackData,
}

impl CallbackAction {
    pub fn new(query: &CallbackQuery) -> Self {
        let data = query.data.clone().unwrap_or_default();
        let payload = CallbackData::parse(&data).unwrap_or_default();

        Self {
            id: query.id.clone(),
            sender: Sender::from(&query.from),
            message: query.message.as_ref().map(IncomingMessage::new),
            inline_message_id: query.inline_message_id.clone(),
            data,
            payload,
        }
    }

    /// Message to edit in response to this action.
    pub fn edit_target(&self) -> Option<EditTarget> {
        match (&self.inline_message_id, &self.message) {
            (Some(id), _) => Some(EditTarget::Inline(id.clone())),
            (None, Some(message)) => Some(message.edit_target()),
            (None, None) => None,
        }
    }
}

/// A search-as-you-type inline query.
#[derive(Debug, Clone)]
pub struct InlineQueryRequest {
    pub id: String,
    pub sender: Sender,
    pub query: String,
    pub offset: String,
    pub location: Option<Location>,
}

impl InlineQueryRequest {
    pub fn new(query: &InlineQuery) -> Self {
        Self {
            id: query.id.clone(),
            sender: Sender::from(&query.from),
            query: query.query.clone(),
            offset: query.offset.clone(),
            location: query.location,
        }
    }
}

/// Notice that the user picked one of the offered inline results.
#[derive(Debug, Clone)]
pub struct ChosenInlineResultNotice {
    pub result_id: String,
    pub sender: Sender,
    pub query: String,
    pub location: Option<Location>,
    pub inline_message_id: Option<String>,
}

impl ChosenInlineResultNotice {
    pub fn new(result: &ChosenInlineResult) -> Self {
        Self {
            result_id: result.result_id.clone(),
            sender: Sender::from(&result.from),
            query: result.query.clone(),
            location: result.location,
            inline_message_id: result.inline_message_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegram_client::Chat;

    #[test]
    fn test_callback_data_wire_format() {
        let data = CallbackData::new("eta", "96049").with_services(vec!["2".into(), "24".into()]);
        assert_eq!(
            data.encode().unwrap(),
            r#"{"t":"eta","b":"96049","s":["2","24"]}"#
        );

        let bare = CallbackData::new("eta", "96049");
        assert_eq!(bare.encode().unwrap(), r#"{"t":"eta","b":"96049"}"#);
    }

    #[test]
    fn test_callback_action_prefers_inline_target() {
        let query = CallbackQuery {
            id: "1".into(),
            inline_message_id: Some("inline".into()),
            message: Some(Message {
                message_id: 3,
                chat: Chat {
                    id: 9,
                    ..Default::default()
                },
                ..Default::default()
            }),
            data: Some(r#"{"t":"eta","b":"96049"}"#.into()),
            ..Default::default()
        };
        let action = CallbackAction::new(&query);

        assert_eq!(action.payload.bus_stop.as_deref(), Some("96049"));
        assert_eq!(action.edit_target(), Some(EditTarget::Inline("inline".into())));
    }

    #[test]
    fn test_callback_action_with_malformed_payload() {
        let query = CallbackQuery {
            data: Some(r#"{"t":"eta","s":"not-a-list"}"#.into()),
            ..Default::default()
        };
        let action = CallbackAction::new(&query);

        assert_eq!(action.payload, CallbackData::default());
        assert_eq!(action.edit_target(), None);
    }

    #[test]
    fn test_venue_envelope_exposes_location() {
        let location = Location {
            latitude: 1.35,
            longitude: 103.9,
        };
        let message = Message {
            venue: Some(Venue {
                location,
                title: "Changi".into(),
                address: "Airport Blvd".into(),
                foursquare_id: None,
            }),
            ..Default::default()
        };
        let envelope = MessageEnvelope::new(MessageKind::Venue, &message);

        assert_eq!(envelope.kind(), MessageKind::Venue);
        assert_eq!(envelope.location(), Some(location));
        assert!(envelope.text().is_none());
    }

    #[test]
    fn test_missing_field_falls_back_to_other() {
        let envelope = MessageEnvelope::new(MessageKind::Photo, &Message::default());
        assert_eq!(envelope.kind(), MessageKind::Other);
        assert_eq!(envelope.message().first_name(), "");
    }
}
