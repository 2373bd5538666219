//! Transport implementations
//!
//! A transport delivers one message to one chat. Routers call it once per
//! destination; an error for one destination never prevents the others.

pub mod telegram;

pub use telegram::{TelegramTransport, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};

use crate::core::{ParseMode, Result};
use serde::Serialize;

/// A message addressed to a single chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    /// Send silently; the inverse of the entry's urgency
    pub disable_notification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            disable_notification: false,
            parse_mode: None,
        }
    }

    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.disable_notification = silent;
        self
    }

    #[must_use]
    pub fn with_parse_mode(mut self, parse_mode: Option<ParseMode>) -> Self {
        self.parse_mode = parse_mode;
        self
    }
}

/// Remote endpoint that accepts chat messages
pub trait Transport: Send + Sync {
    fn send(&self, message: &OutgoingMessage) -> Result<()>;

    fn name(&self) -> &str;
}
