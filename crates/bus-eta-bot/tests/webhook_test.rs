//! Integration tests for the webhook endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bus_eta_bot::webhook::create_router;
use common::*;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "/telegram/update",
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_update_is_dispatched() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "/telegram/update",
    );

    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("Bus Eta Bot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(12)))
        .expect(1)
        .mount(&telegram_server)
        .await;

    let update = json!({
        "update_id": 100,
        "message": {
            "message_id": 11,
            "date": 1496645187,
            "from": user(),
            "chat": { "id": CHAT_ID, "type": "private" },
            "text": "/version",
            "entities": [{ "type": "bot_command", "offset": 0, "length": 8 }]
        }
    });

    let response = app
        .oneshot(post("/telegram/update", update.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_path_without_leading_slash() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "hook",
    );

    let response = app.oneshot(post("/hook", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_is_acknowledged() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "/telegram/update",
    );

    let response = app
        .oneshot(post("/telegram/update", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_handler_failure_is_acknowledged() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "/telegram/update",
    );

    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("Getting etas"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&telegram_server)
        .await;
    Mock::given(method("POST"))
        .and(path(method_path("sendMessage")))
        .and(body_string_contains("Something went wrong"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(13)))
        .expect(1)
        .mount(&telegram_server)
        .await;

    let body = serde_json::to_string(&command_update("/help")).unwrap();
    let response = app.oneshot(post("/telegram/update", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let telegram_server = MockServer::start().await;
    let datamall_server = MockServer::start().await;
    let app = create_router(
        Arc::new(test_dispatcher(&telegram_server, &datamall_server)),
        "/telegram/update",
    );

    let response = app.oneshot(post("/other", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
