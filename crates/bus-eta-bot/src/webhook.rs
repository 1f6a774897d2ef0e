//! Webhook endpoint.

use crate::bot::BusEtaBot;
use crate::runner::dispatch_logged;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bot_dispatch::Dispatcher;
use serde::Serialize;
use std::sync::Arc;
use telegram_client::Update;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Build the webhook router.
///
/// Updates are accepted as POST on `path`. Telegram redelivers anything
/// that is not answered with a 2xx, so the endpoint answers 200 even for
/// bodies it cannot parse and for handler failures. Failures are reported
/// to the user by [`dispatch_logged`].
pub fn create_router(dispatcher: Arc<Dispatcher<BusEtaBot>>, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    Router::new()
        .route(&path, post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn receive_update(
    State(dispatcher): State<Arc<Dispatcher<BusEtaBot>>>,
    body: Bytes,
) -> StatusCode {
    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => dispatch_logged(&dispatcher, &update).await,
        Err(e) => warn!("Discarding malformed update: {}", e),
    }

    StatusCode::OK
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
