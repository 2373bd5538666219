//! Core router types and traits

pub mod cancel;
pub mod config;
pub(crate) mod dispatch;
pub mod error;
pub mod field;
pub mod format;
pub mod level_policy;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod queue;
pub mod router;
pub mod sink;
pub mod tee;

pub use cancel::{CancelReason, CancelToken};
pub use config::{QueueSettings, RelayConfig};
pub use error::{LoggerError, Result};
pub use field::{format_fields, Field, FieldValue};
pub use format::{
    default_format, Formatter, MessageLayout, ParseMode, DEFAULT_LOGGER_NAME,
    DEFAULT_TIMESTAMP_FORMAT,
};
pub use level_policy::{LevelPolicy, Notification, DEFAULT_LEVEL};
pub use log_entry::{Caller, LogEntry};
pub use log_level::{LevelSet, LogLevel, ALL_LEVELS};
pub use logger::Logger;
pub use metrics::RouterMetrics;
pub use queue::{DrainState, QueueOptions, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY};
pub use router::{DeliveryMode, RouterBuilder, TelegramRouter};
pub use sink::LogSink;
pub use tee::Tee;
