//! Telegram Bot API client.

mod client;
mod error;
mod outgoing;
mod receiver;
mod types;

pub use client::{TelegramClient, DEFAULT_API_URL};
pub use error::TelegramError;
pub use outgoing::*;
pub use receiver::UpdateReceiver;
pub use types::*;
