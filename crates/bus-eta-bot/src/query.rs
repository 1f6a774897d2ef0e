//! Free-text ETA queries.

use once_cell::sync::Lazy;
use regex::Regex;

static BUS_STOP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{5}\b").expect("bus stop code regex"));

/// Only this many characters of a query are considered.
const MAX_QUERY_CHARS: usize = 100;

/// A bus stop and an optional service filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtaQuery {
    pub bus_stop: String,
    pub services: Vec<String>,
}

/// Find a bus stop code in `text`, taking the words after it as service
/// numbers. Returns `None` if there is no 5-digit code.
pub fn infer_eta_query(text: &str) -> Option<EtaQuery> {
    let text = text
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect::<String>()
        .to_uppercase();

    let code = BUS_STOP_CODE.find(&text)?;
    let services = text[code.end()..]
        .split_whitespace()
        .map(String::from)
        .collect();

    Some(EtaQuery {
        bus_stop: code.as_str().to_string(),
        services,
    })
}
