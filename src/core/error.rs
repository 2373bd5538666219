//! Error types for the Telegram logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid configuration with details
    ///
    /// Raised only while building a router, never after.
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Sending a message to one destination failed
    #[error("Failed to send message to chat {chat_id}: {message}")]
    Delivery { chat_id: i64, message: String },

    /// The Bot API answered with `"ok": false`
    #[error("Telegram API error {code}: {description}")]
    TelegramApi { code: i64, description: String },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Channel send error
    #[error("Failed to enqueue log entry: delivery queue is closed")]
    ChannelSendError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn missing_token() -> Self {
        Self::config("bot token", "bot access token not defined")
    }

    pub fn missing_chat_ids() -> Self {
        Self::config("chat ids", "chat ids not defined")
    }

    /// Two delivery modes were selected for one router
    pub fn mode_conflict(first: impl std::fmt::Display, second: impl std::fmt::Display) -> Self {
        Self::config(
            "delivery mode",
            format!("{} delivery cannot be combined with {} delivery", first, second),
        )
    }

    /// Create a delivery error for a single chat
    pub fn delivery(chat_id: i64, message: impl Into<String>) -> Self {
        LoggerError::Delivery {
            chat_id,
            message: message.into(),
        }
    }

    pub fn telegram_api(code: i64, description: impl Into<String>) -> Self {
        LoggerError::TelegramApi {
            code,
            description: description.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::InvalidConfiguration { .. })
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, LoggerError::Delivery { .. })
    }
}
