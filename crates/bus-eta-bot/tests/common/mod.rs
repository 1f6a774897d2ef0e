//! Common test utilities for integration tests.

#![allow(dead_code)]

use bot_dispatch::Dispatcher;
use bus_eta_bot::{handlers, BotSettings, BusEtaBot, DatamallEtas};
use bus_stop_store::BusStopStore;
use chrono::{DateTime, Utc};
use datamall_client::DatamallClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use telegram_client::{TelegramClient, Update};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const CHAT_ID: i64 = 42;

/// Telegram method path on the mock server.
pub fn method_path(method: &str) -> String {
    format!("/bot{}/{}", TOKEN, method)
}

/// Frozen wall clock: 05 Jun 17 14:46 SGT.
pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2017-06-05T14:46:27+08:00")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn test_bot(telegram_server: &MockServer, datamall_server: &MockServer) -> BusEtaBot {
    let telegram =
        TelegramClient::new(TOKEN, telegram_server.uri(), Duration::from_secs(5)).unwrap();
    let datamall =
        DatamallClient::new("test-account-key", datamall_server.uri(), Duration::from_secs(5))
            .unwrap();
    let bus_stops = BusStopStore::from_json(include_str!("../../data/bus-stops.json")).unwrap();

    BusEtaBot::new(
        telegram,
        Arc::new(DatamallEtas::new(datamall, 0)),
        bus_stops,
        BotSettings::default(),
    )
    .with_clock(now)
}

/// Dispatcher wired with every bot handler.
pub fn test_dispatcher(
    telegram_server: &MockServer,
    datamall_server: &MockServer,
) -> Dispatcher<BusEtaBot> {
    Dispatcher::new(
        Arc::new(test_bot(telegram_server, datamall_server)),
        handlers::registry(),
    )
}

/// Successful Bot API response.
pub fn telegram_ok(result: Value) -> Value {
    json!({ "ok": true, "result": result })
}

pub fn sent_message(message_id: i64) -> Value {
    telegram_ok(json!({
        "message_id": message_id,
        "date": 1496645187,
        "chat": { "id": CHAT_ID, "type": "private" }
    }))
}

pub fn user() -> Value {
    json!({ "id": 7, "is_bot": false, "first_name": "Jane", "username": "jane" })
}

pub fn text_update(text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "date": 1496645187,
            "from": user(),
            "chat": { "id": CHAT_ID, "type": "private" },
            "text": text
        }
    }))
    .unwrap()
}

pub fn command_update(text: &str) -> Update {
    let length = text.split_whitespace().next().unwrap().encode_utf16().count();
    serde_json::from_value(json!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "date": 1496645187,
            "from": user(),
            "chat": { "id": CHAT_ID, "type": "private" },
            "text": text,
            "entities": [{ "type": "bot_command", "offset": 0, "length": length }]
        }
    }))
    .unwrap()
}

/// DataMall BusArrivalv2 response for stop 96049.
pub fn arrival_96049() -> Value {
    json!({
        "odata.metadata": "http://datamall2.mytransport.sg/ltaodataservice/$metadata#BusArrivalv2/@Element",
        "BusStopCode": "96049",
        "Services": [
            {
                "ServiceNo": "24",
                "Operator": "SBST",
                "NextBus": {
                    "EstimatedArrival": "2017-06-05T14:47:10+08:00",
                    "Latitude": "1.3398",
                    "Longitude": "103.9602",
                    "VisitNumber": "1",
                    "Load": "SEA",
                    "Feature": "WAB",
                    "Type": "DD"
                },
                "NextBus2": {
                    "EstimatedArrival": "2017-06-05T14:55:00+08:00",
                    "Load": "SEA",
                    "Feature": "WAB",
                    "Type": "SD"
                },
                "NextBus3": {
                    "EstimatedArrival": "2017-06-05T15:05:00+08:00",
                    "Load": "SEA",
                    "Feature": "WAB",
                    "Type": "SD"
                }
            },
            {
                "ServiceNo": "2",
                "Operator": "GAS",
                "NextBus": {
                    "EstimatedArrival": "2017-06-05T14:49:00+08:00",
                    "Load": "SDA",
                    "Feature": "WAB",
                    "Type": "SD"
                },
                "NextBus2": {
                    "EstimatedArrival": "2017-06-05T14:58:30+08:00",
                    "Load": "SEA",
                    "Feature": "",
                    "Type": "SD"
                },
                "NextBus3": {
                    "EstimatedArrival": "",
                    "Load": "",
                    "Feature": "",
                    "Type": ""
                }
            }
        ]
    })
}
