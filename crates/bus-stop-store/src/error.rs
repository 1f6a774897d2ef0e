//! Bus stop store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusStopError {
    #[error("Failed to read bus stops from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bus stop data: {0}")]
    Json(#[from] serde_json::Error),
}
