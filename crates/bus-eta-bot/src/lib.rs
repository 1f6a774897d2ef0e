//! Bus Eta Bot.
//!
//! Telegram bot that answers with Singapore bus arrival times. Updates
//! arrive by long polling or webhook and are routed through a
//! [`bot_dispatch::Dispatcher`] to the handlers in [`handlers`].

pub mod bot;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod query;
pub mod runner;
pub mod webhook;

pub use bot::{BotSettings, BusEtaBot, DatamallEtas, EtaProvider};
pub use config::{Config, Mode};
pub use error::{AppError, AppResult};
