//! Telegram Bot API HTTP client.

use crate::error::TelegramError;
use crate::outgoing::*;
use crate::types::*;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API client.
///
/// The bot token is part of every request path, so it is held as a
/// `SecretString` and never logged.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl TelegramClient {
    /// Create a new Telegram client.
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
        })
    }

    /// Check that the token is accepted.
    pub async fn health_check(&self) -> bool {
        self.get_me().await.is_ok()
    }

    /// Get the bot's own user.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for pending updates.
    #[instrument(skip(self))]
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
        };

        // The HTTP request has to outlive the server-side poll.
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &request,
                Some(timeout + Duration::from_secs(10)),
            )
            .await?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    /// Send a text message to a chat.
    #[instrument(skip(self, message))]
    pub async fn send_message(
        &self,
        chat_id: i64,
        message: &OutgoingTextMessage,
    ) -> Result<Message, TelegramError> {
        let request = SendMessageRequest { chat_id, message };
        let sent: Message = self.call("sendMessage", &request, None).await?;
        debug!("Sent message {} to {}", sent.message_id, chat_id);
        Ok(sent)
    }

    /// Replace the text of a previously sent message.
    #[instrument(skip(self, message))]
    pub async fn edit_message_text(
        &self,
        target: &EditTarget,
        message: &OutgoingTextMessage,
    ) -> Result<(), TelegramError> {
        let request = EditMessageTextRequest::new(target, message);
        // Result is the edited Message for chat messages and `true` for inline ones.
        let _: serde_json::Value = self.call("editMessageText", &request, None).await?;
        Ok(())
    }

    /// Acknowledge a callback query, optionally showing a notification.
    #[instrument(skip(self))]
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TelegramError> {
        self.send_callback_answer(callback_query_id, text, false).await
    }

    /// Acknowledge a callback query with an alert the user has to dismiss.
    #[instrument(skip(self))]
    pub async fn alert_callback_query(
        &self,
        callback_query_id: &str,
        text: &str,
    ) -> Result<(), TelegramError> {
        self.send_callback_answer(callback_query_id, Some(text), true)
            .await
    }

    async fn send_callback_answer(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TelegramError> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id,
            text,
            show_alert,
        };
        let _: bool = self.call("answerCallbackQuery", &request, None).await?;
        Ok(())
    }

    /// Answer an inline query with a set of results.
    #[instrument(skip(self, answer), fields(results = answer.results.len()))]
    pub async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        answer: &InlineQueryAnswer,
    ) -> Result<(), TelegramError> {
        let request = AnswerInlineQueryRequest {
            inline_query_id,
            answer,
        };
        let _: bool = self.call("answerInlineQuery", &request, None).await?;
        Ok(())
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }

    /// POST a method call and unwrap the `{ok, result}` envelope.
    async fn call<P, T>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(TelegramError::Api {
                    code: i32::from(status.as_u16()),
                    description: body,
                })
            }
        };

        if parsed.ok {
            return parsed.result.ok_or(TelegramError::EmptyResult(method));
        }

        let code = parsed
            .error_code
            .unwrap_or_else(|| i32::from(status.as_u16()));
        let description = parsed.description.unwrap_or_default();
        warn!("{} failed: {} - {}", method, code, description);

        Err(match code {
            401 => TelegramError::Unauthorized,
            429 => TelegramError::RateLimit {
                retry_after: parsed.parameters.and_then(|p| p.retry_after),
            },
            _ => TelegramError::Api { code, description },
        })
    }
}
