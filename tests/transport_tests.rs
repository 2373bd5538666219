//! Bot API transport tests against a mock HTTP server

use mockito::{Matcher, Server};
use rust_telegram_logger::prelude::*;
use rust_telegram_logger::transport::DEFAULT_REQUEST_TIMEOUT;
use serde_json::json;

const TOKEN: &str = "42:secret";
const SEND_PATH: &str = "/bot42:secret/sendMessage";

fn transport_for(server: &Server) -> TelegramTransport {
    TelegramTransport::with_options(TOKEN, server.url(), DEFAULT_REQUEST_TIMEOUT)
        .expect("Failed to create transport")
}

#[test]
fn test_send_message_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", SEND_PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "chat_id": -100,
            "text": "deploy finished",
            "disable_notification": true,
            "parse_mode": "HTML"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create();

    let message = OutgoingMessage::new(-100, "deploy finished")
        .silent(true)
        .with_parse_mode(Some(ParseMode::Html));
    transport_for(&server)
        .send(&message)
        .expect("Failed to send");

    mock.assert();
}

#[test]
fn test_api_error_is_reported() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", SEND_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
        .create();

    let err = transport_for(&server)
        .send(&OutgoingMessage::new(1, "hi"))
        .unwrap_err();

    match err {
        LoggerError::TelegramApi { code, description } => {
            assert_eq!(code, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_non_json_failure_uses_status() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", SEND_PATH)
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create();

    let err = transport_for(&server)
        .send(&OutgoingMessage::new(1, "hi"))
        .unwrap_err();

    assert!(matches!(err, LoggerError::TelegramApi { code: 502, .. }));
    assert!(!err.to_string().contains("secret"));
}

#[test]
fn test_get_me() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/bot42:secret/getMe")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"ok":true,"result":{"id":42,"is_bot":true,"first_name":"Alerts","username":"alerts_bot"}}"#,
        )
        .create();

    let bot = transport_for(&server).get_me().expect("Failed to call getMe");
    assert_eq!(bot.id, 42);
    assert!(bot.is_bot);
    assert_eq!(bot.username.as_deref(), Some("alerts_bot"));
}

#[test]
fn test_sync_router_over_http() {
    let mut server = Server::new();
    let loud = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::PartialJson(json!({
            "chat_id": 7,
            "disable_notification": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":10}}"#)
        .expect(1)
        .create();
    let failing = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::PartialJson(json!({ "chat_id": 8 })))
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#)
        .expect(1)
        .create();

    let router = TelegramRouter::builder(TOKEN, vec![7, 8])
        .api_url(server.url())
        .level(LogLevel::Error)
        .sync()
        .build()
        .expect("Failed to build router");

    let err = router
        .accept(&LogEntry::new(LogLevel::Error, "payment failed"), &[])
        .unwrap_err();

    assert!(err.is_delivery());
    assert!(err.to_string().contains("chat 8"));
    loud.assert();
    failing.assert();
    assert_eq!(router.metrics().delivered_count(), 1);
    assert_eq!(router.metrics().failed_count(), 1);
}
