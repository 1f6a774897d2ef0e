//! Telegram client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bot token rejected")]
    Unauthorized,

    #[error("Rate limited (retry after {retry_after:?}s)")]
    RateLimit { retry_after: Option<u64> },

    #[error("API error: {code} - {description}")]
    Api { code: i32, description: String },

    #[error("Empty result for {0}")]
    EmptyResult(&'static str),
}
