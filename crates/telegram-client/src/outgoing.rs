//! Outbound Bot API request types.

use crate::types::Location;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
            switch_inline_query_current_chat: None,
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
            switch_inline_query_current_chat: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }

    /// Keyboard with a single button.
    pub fn single(button: InlineKeyboardButton) -> Self {
        Self::new(vec![vec![button]])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceReply {
    pub force_reply: bool,
    pub selective: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    InlineKeyboard(InlineKeyboardMarkup),
    ForceReply(ForceReply),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        ReplyMarkup::InlineKeyboard(markup)
    }
}

/// A text message to be sent or used to replace an existing message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutgoingTextMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl OutgoingTextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }

    pub fn disable_web_page_preview(mut self) -> Self {
        self.disable_web_page_preview = Some(true);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }

    /// Ask the client to open a reply to this message.
    pub fn force_reply(self) -> Self {
        self.reply_markup(ReplyMarkup::ForceReply(ForceReply {
            force_reply: true,
            selective: true,
        }))
    }

    /// Inline keyboard attached to this message, if any. Edits only accept
    /// inline keyboards.
    pub fn inline_keyboard(&self) -> Option<&InlineKeyboardMarkup> {
        match &self.reply_markup {
            Some(ReplyMarkup::InlineKeyboard(markup)) => Some(markup),
            _ => None,
        }
    }
}

/// Which message an edit applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Chat { chat_id: i64, message_id: i64 },
    Inline(String),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    #[serde(flatten)]
    pub message: &'a OutgoingTextMessage,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct EditMessageTextRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<&'a str>,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<&'a InlineKeyboardMarkup>,
}

impl<'a> EditMessageTextRequest<'a> {
    pub fn new(target: &'a EditTarget, message: &'a OutgoingTextMessage) -> Self {
        let (chat_id, message_id, inline_message_id) = match target {
            EditTarget::Chat {
                chat_id,
                message_id,
            } => (Some(*chat_id), Some(*message_id), None),
            EditTarget::Inline(id) => (None, None, Some(id.as_str())),
        };

        Self {
            chat_id,
            message_id,
            inline_message_id,
            text: &message.text,
            parse_mode: message.parse_mode,
            disable_web_page_preview: message.disable_web_page_preview,
            reply_markup: message.inline_keyboard(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub show_alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputTextMessageContent {
    pub message_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InlineQueryResult {
    Location {
        id: String,
        title: String,
        latitude: f64,
        longitude: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_markup: Option<InlineKeyboardMarkup>,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_message_content: Option<InputTextMessageContent>,
    },
    Article {
        id: String,
        title: String,
        input_message_content: InputTextMessageContent,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_markup: Option<InlineKeyboardMarkup>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl InlineQueryResult {
    pub fn location(id: impl Into<String>, title: impl Into<String>, location: Location) -> Self {
        InlineQueryResult::Location {
            id: id.into(),
            title: title.into(),
            latitude: location.latitude,
            longitude: location.longitude,
            reply_markup: None,
            input_message_content: None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            InlineQueryResult::Location { id, .. } | InlineQueryResult::Article { id, .. } => id,
        }
    }
}

/// Results plus caching options for `answerInlineQuery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InlineQueryAnswer {
    pub results: Vec<InlineQueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_personal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnswerInlineQueryRequest<'a> {
    pub inline_query_id: &'a str,
    #[serde(flatten)]
    pub answer: &'a InlineQueryAnswer,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
}
