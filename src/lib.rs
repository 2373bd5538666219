//! # Rust Telegram Logger
//!
//! A logging backend that delivers log entries to Telegram chats.
//!
//! ## Features
//!
//! - **Level Policy**: threshold or exact-level filtering, with independent
//!   control over which levels send notifying messages
//! - **Three Delivery Modes**: blocking, fire-and-forget, or interval batches
//!   from a bounded queue with a flush-on-shutdown drain
//! - **Composable**: implements [`LogSink`], so it can be tee'd with a console
//!   sink behind one [`Logger`]
//! - **Pluggable Formatting**: built-in layouts or any `Fn(&LogEntry, &[Field]) -> String`

pub mod core;
pub mod macros;
pub mod sinks;
pub mod transport;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    pub use crate::core::{
        CancelReason, CancelToken, Caller, DeliveryMode, DrainState, Field, FieldValue, LevelPolicy,
        LevelSet, LogEntry, LogLevel, LogSink, Logger, LoggerError, MessageLayout, Notification,
        ParseMode, QueueOptions, RelayConfig, Result, RouterBuilder, RouterMetrics, Tee,
        TelegramRouter, ALL_LEVELS,
    };
    pub use crate::transport::{OutgoingMessage, TelegramTransport, Transport};
}

#[cfg(feature = "console")]
pub use sinks::ConsoleSink;
pub use core::{
    CancelReason, CancelToken, Caller, DeliveryMode, DrainState, Field, FieldValue, LevelPolicy,
    LevelSet, LogEntry, LogLevel, LogSink, Logger, LoggerError, MessageLayout, Notification,
    ParseMode, QueueOptions, QueueSettings, RelayConfig, Result, RouterBuilder, RouterMetrics,
    Tee, TelegramRouter, ALL_LEVELS,
};
pub use transport::{OutgoingMessage, TelegramTransport, Transport};
