//! Serializable router configuration
//!
//! Mirrors the [`RouterBuilder`] options as plain data so a router can be
//! configured from a JSON file.
//!
//! ```json
//! {
//!   "bot_token": "123456:ABC-DEF",
//!   "chat_ids": [-1001234567890],
//!   "level": "warn",
//!   "mode": "queued",
//!   "queue": { "interval_ms": 10000, "capacity": 1000 },
//!   "notify_on": ["error", "fatal", "panic"],
//!   "parse_mode": "HTML"
//! }
//! ```

use super::{
    cancel::CancelToken,
    error::Result,
    format::{MessageLayout, ParseMode},
    log_level::LogLevel,
    queue::{QueueOptions, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY},
    router::{DeliveryMode, RouterBuilder, TelegramRouter},
};
use crate::transport::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub interval_ms: u64,
    pub capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bot_token: String,
    pub chat_ids: Vec<i64>,
    /// Threshold level
    pub level: Option<LogLevel>,
    /// Single level; takes precedence over `level`
    pub exact_level: Option<LogLevel>,
    pub mode: Option<DeliveryMode>,
    /// Queue settings; presence selects queued delivery
    pub queue: Option<QueueSettings>,
    pub disable_notification: bool,
    pub notify_on: Option<Vec<LogLevel>>,
    pub parse_mode: Option<ParseMode>,
    pub layout: MessageLayout,
    pub api_url: String,
    pub request_timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_ids: Vec::new(),
            level: None,
            exact_level: None,
            mode: None,
            queue: None,
            disable_notification: false,
            notify_on: None,
            parse_mode: None,
            layout: MessageLayout::default(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl RelayConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Translate into builder options
    ///
    /// `cancel` governs the drain loop when queued delivery is selected and is
    /// ignored otherwise. Conflicting selections surface from
    /// [`RouterBuilder::build`].
    pub fn into_builder(self, cancel: CancelToken) -> RouterBuilder {
        let mut builder = TelegramRouter::builder(self.bot_token, self.chat_ids)
            .layout(self.layout)
            .api_url(self.api_url)
            .request_timeout(Duration::from_millis(self.request_timeout_ms));

        if let Some(level) = self.level {
            builder = builder.level(level);
        }
        if let Some(level) = self.exact_level {
            builder = builder.exact_level(level);
        }

        match self.mode {
            Some(DeliveryMode::Sync) => builder = builder.sync(),
            Some(DeliveryMode::Async) => builder = builder.asynchronous(),
            Some(DeliveryMode::Queued) | None => {}
        }
        if self.mode == Some(DeliveryMode::Queued) || self.queue.is_some() {
            let settings = self.queue.unwrap_or_default();
            builder = builder.queue(QueueOptions::new(
                cancel,
                Duration::from_millis(settings.interval_ms),
                settings.capacity,
            ));
        }

        if self.disable_notification {
            builder = builder.disable_notification();
        }
        if let Some(levels) = self.notify_on {
            builder = builder.notify_on(levels);
        }
        if let Some(parse_mode) = self.parse_mode {
            builder = builder.parse_mode(parse_mode);
        }

        builder
    }

    pub fn build(self, cancel: CancelToken) -> Result<TelegramRouter> {
        self.into_builder(cancel).build()
    }
}
