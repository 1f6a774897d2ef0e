//! Bus stop directory with autocomplete and radius search.

mod error;
mod geo;
mod store;
mod types;

pub use error::BusStopError;
pub use geo::distance;
pub use store::{BusStopStore, DEFAULT_COMPLETION_LIMIT};
pub use types::*;
