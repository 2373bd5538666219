//! Sink implementations besides the Telegram router

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "console")]
pub use console::ConsoleSink;

// Re-export trait for convenience
pub use crate::core::LogSink;
