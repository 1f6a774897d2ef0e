//! LTA DataMall bus arrival client.

mod client;
mod error;
mod types;

pub use client::{DatamallClient, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES};
pub use error::DatamallError;
pub use types::*;
