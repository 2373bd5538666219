//! Integration tests for the Telegram router
//!
//! These tests verify:
//! - Level gating through the logging frontend
//! - Sync delivery to several chats with partial failures
//! - Async fire-and-forget delivery
//! - Queued delivery: ticks, flush, and the final drain on cancellation
//! - Configuration errors raised by the builder
//! - Field inheritance across derived handles

use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use rust_telegram_logger::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Records every message and fails for the chats listed in `failing`
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMessage>>,
    attempts: Mutex<Vec<i64>>,
    failing: Vec<i64>,
}

impl RecordingTransport {
    fn failing_for(chat_ids: Vec<i64>) -> Self {
        Self {
            failing: chat_ids,
            ..Self::default()
        }
    }

    fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.text.clone()).collect()
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, message: &OutgoingMessage) -> Result<()> {
        self.attempts.lock().push(message.chat_id);
        if self.failing.contains(&message.chat_id) {
            return Err(LoggerError::telegram_api(400, "Bad Request: chat not found"));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn message_only(entry: &LogEntry, fields: &[Field]) -> String {
    if fields.is_empty() {
        return entry.message.clone();
    }
    let rendered: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    format!("{} {}", entry.message, rendered.join(" "))
}

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_logger_skips_entries_below_threshold() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .level(LogLevel::Warn)
        .sync()
        .build()
        .expect("Failed to build router");
    let logger = Logger::new(router.clone());

    logger.info("routine");
    logger.debug("noise");
    assert_eq!(transport.sent_count(), 0);
    assert_eq!(router.metrics().delivered_count(), 0);

    logger.error("disk full");
    assert_eq!(transport.sent_count(), 1);
}

#[test]
fn test_exact_level_delivers_only_that_level() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .exact_level(LogLevel::Info)
        .formatter(message_only)
        .sync()
        .build()
        .expect("Failed to build router");

    for level in ALL_LEVELS {
        router
            .accept(&LogEntry::new(level, level.to_str()), &[])
            .expect("Failed to accept");
    }

    assert_eq!(transport.texts(), vec!["INFO".to_string()]);
}

#[test]
fn test_sync_delivery_attempts_every_chat() {
    let transport = Arc::new(RecordingTransport::failing_for(vec![10]));
    let router = TelegramRouter::builder("token", vec![10, 20])
        .transport(transport.clone())
        .sync()
        .build()
        .expect("Failed to build router");

    let err = router
        .accept(&LogEntry::new(LogLevel::Error, "boom"), &[])
        .unwrap_err();

    match err {
        LoggerError::Delivery { chat_id, message } => {
            assert_eq!(chat_id, 10);
            assert!(message.contains("chat not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(*transport.attempts.lock(), vec![10, 20]);
    assert_eq!(transport.sent.lock()[0].chat_id, 20);
    assert_eq!(router.metrics().delivered_count(), 1);
    assert_eq!(router.metrics().failed_count(), 1);
}

#[test]
fn test_sync_notification_policy() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .level(LogLevel::Info)
        .disable_notification()
        .sync()
        .build()
        .expect("Failed to build router");

    router
        .accept(&LogEntry::new(LogLevel::Panic, "down"), &[])
        .expect("Failed to accept");
    assert!(transport.sent.lock()[0].disable_notification);
}

#[test]
fn test_async_delivery_arrives() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1, 2])
        .transport(transport.clone())
        .formatter(message_only)
        .build()
        .expect("Failed to build router");
    assert_eq!(router.mode(), DeliveryMode::Async);

    router
        .accept(&LogEntry::new(LogLevel::Error, "async boom"), &[])
        .expect("Async accept never fails");

    assert!(wait_until(Duration::from_secs(5), || transport.sent_count() == 2));
    assert_eq!(transport.texts(), vec!["async boom", "async boom"]);
    assert_eq!(router.metrics().spawned_count(), 1);
}

#[test]
fn test_async_errors_are_not_returned() {
    let transport = Arc::new(RecordingTransport::failing_for(vec![1]));
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .asynchronous()
        .build()
        .expect("Failed to build router");

    assert!(router
        .accept(&LogEntry::new(LogLevel::Error, "lost"), &[])
        .is_ok());
    assert!(wait_until(Duration::from_secs(5), || router
        .metrics()
        .failed_count()
        == 1));
}

#[test]
fn test_queued_delivery_on_tick() {
    let transport = Arc::new(RecordingTransport::default());
    let shutdown = CancelToken::new();
    let (tick_tx, tick_rx) = unbounded();

    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .formatter(message_only)
        .queue(QueueOptions::new(shutdown.clone(), Duration::from_secs(3600), 2).with_ticker(tick_rx))
        .build()
        .expect("Failed to build router");

    assert_eq!(router.mode(), DeliveryMode::Queued);
    assert_eq!(router.queue_capacity(), Some(2));
    assert_eq!(router.drain_state(), Some(DrainState::Started));

    router.accept(&LogEntry::new(LogLevel::Warn, "first"), &[]).unwrap();
    router.accept(&LogEntry::new(LogLevel::Error, "second"), &[]).unwrap();
    assert_eq!(router.queue_len(), 2);
    assert_eq!(transport.sent_count(), 0);

    tick_tx.send(Instant::now()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || transport.sent_count() == 2));
    assert_eq!(transport.texts(), vec!["first", "second"]);
    assert_eq!(router.queue_len(), 0);

    shutdown.cancel();
    assert_eq!(router.join_drain_loop().unwrap(), Some(CancelReason::Cancelled));
}

#[test]
fn test_flush_drains_queued_entries() {
    let transport = Arc::new(RecordingTransport::default());
    let shutdown = CancelToken::new();
    let (_tick_tx, tick_rx) = unbounded();

    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .queue(QueueOptions::new(shutdown.clone(), Duration::ZERO, 10).with_ticker(tick_rx))
        .build()
        .expect("Failed to build router");

    for i in 0..3 {
        router
            .accept(&LogEntry::new(LogLevel::Error, format!("entry {}", i)), &[])
            .unwrap();
    }
    assert_eq!(router.queue_len(), 3);

    router.flush().expect("Failed to flush");
    assert_eq!(transport.sent_count(), 3);
    assert_eq!(router.queue_len(), 0);
    assert_eq!(router.metrics().drained_count(), 3);

    shutdown.cancel();
    router.join_drain_loop().unwrap();
}

#[test]
fn test_cancel_triggers_final_drain() {
    let transport = Arc::new(RecordingTransport::default());
    let shutdown = CancelToken::new();

    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .queue(QueueOptions::new(shutdown.clone(), Duration::from_secs(3600), 10))
        .build()
        .expect("Failed to build router");

    for _ in 0..5 {
        router.accept(&LogEntry::new(LogLevel::Fatal, "pending"), &[]).unwrap();
    }
    assert_eq!(transport.sent_count(), 0);

    shutdown.cancel();
    let reason = router.join_drain_loop().expect("Drain loop panicked");

    assert_eq!(reason, Some(CancelReason::Cancelled));
    assert_eq!(transport.sent_count(), 5);
    assert_eq!(router.drain_state(), Some(DrainState::Stopped));
    assert_eq!(router.join_drain_loop().unwrap(), None);

    let err = router
        .accept(&LogEntry::new(LogLevel::Fatal, "too late"), &[])
        .unwrap_err();
    assert!(matches!(err, LoggerError::ChannelSendError));
}

#[test]
fn test_deadline_stops_drain_loop() {
    let transport = Arc::new(RecordingTransport::default());
    let shutdown = CancelToken::with_timeout(Duration::from_millis(300));

    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .queue(QueueOptions::new(shutdown.clone(), Duration::from_secs(3600), 10))
        .build()
        .expect("Failed to build router");

    router.accept(&LogEntry::new(LogLevel::Error, "late"), &[]).unwrap();

    assert_eq!(
        router.join_drain_loop().unwrap(),
        Some(CancelReason::DeadlineExceeded)
    );
    assert_eq!(shutdown.reason(), Some(CancelReason::DeadlineExceeded));
    assert_eq!(transport.sent_count(), 1);
}

#[test]
fn test_configuration_errors() {
    let err = TelegramRouter::builder("", vec![1]).build().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("bot access token"));

    let err = TelegramRouter::builder("token", Vec::new()).build().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("chat ids"));

    let err = TelegramRouter::builder("token", vec![1])
        .asynchronous()
        .queue(QueueOptions::new(CancelToken::new(), Duration::from_secs(1), 10))
        .build()
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("cannot be combined"));
}

#[test]
fn test_token_checked_before_chat_ids() {
    let err = TelegramRouter::builder("", Vec::new()).build().unwrap_err();
    assert!(err.to_string().contains("bot access token"));
}

#[test]
fn test_derived_handles_append_fields() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .formatter(message_only)
        .sync()
        .build()
        .expect("Failed to build router");

    let logger = Logger::new(router.clone());
    let request_logger = logger
        .with(vec![Field::new("service", "api")])
        .with(vec![Field::new("request", 7)]);

    request_logger
        .log(LogLevel::Error, "failed", &[Field::new("attempt", 2)])
        .unwrap();
    logger.error("plain");

    assert_eq!(
        transport.texts(),
        vec![
            "failed attempt=2 service=api request=7".to_string(),
            "plain".to_string(),
        ]
    );
    assert!(router.inherited_fields().is_empty());
}

#[cfg(feature = "console")]
#[test]
fn test_tee_with_console() {
    let transport = Arc::new(RecordingTransport::default());
    let router = TelegramRouter::builder("token", vec![1])
        .transport(transport.clone())
        .level(LogLevel::Error)
        .sync()
        .build()
        .expect("Failed to build router");

    let tee = Tee::new(Vec::new())
        .and(ConsoleSink::new(LogLevel::Debug).with_colors(false))
        .and(router);
    let logger = Logger::new(tee).named("checkout");

    assert!(logger.enabled(LogLevel::Debug));
    logger.info("console only");
    logger.error("both");

    let sent = transport.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.starts_with("Logger: checkout\n"));
    assert!(sent[0].text.ends_with("\nERROR\nboth"));
}

#[test]
fn test_config_file_builds_queued_router() {
    let config = RelayConfig::from_json_str(
        r#"{
            "bot_token": "123:abc",
            "chat_ids": [5],
            "level": "error",
            "queue": { "interval_ms": 60000, "capacity": 8 }
        }"#,
    )
    .expect("Failed to parse config");

    let shutdown = CancelToken::new();
    let router = config
        .into_builder(shutdown.clone())
        .transport(Arc::new(RecordingTransport::default()))
        .build()
        .expect("Failed to build router");

    assert_eq!(router.mode(), DeliveryMode::Queued);
    assert_eq!(router.queue_capacity(), Some(8));
    assert!(!router.enabled(LogLevel::Warn));

    shutdown.cancel();
    assert_eq!(router.join_drain_loop().unwrap(), Some(CancelReason::Cancelled));
}
