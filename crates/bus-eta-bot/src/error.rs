//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Telegram error: {0}")]
    Telegram(#[from] telegram_client::TelegramError),

    #[error("DataMall error: {0}")]
    Datamall(#[from] datamall_client::DatamallError),

    #[error("Bus stop error: {0}")]
    BusStops(#[from] bus_stop_store::BusStopError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
