//! Logging frontend over any [`LogSink`]
//!
//! The frontend asks the sink whether a level is enabled before building an
//! entry, so disabled levels cost a single check.

use super::{
    error::Result,
    field::Field,
    log_entry::{Caller, LogEntry},
    log_level::LogLevel,
    sink::LogSink,
};
use std::sync::Arc;

/// Named logger writing to a sink
///
/// # Example
/// ```
/// use rust_telegram_logger::prelude::*;
///
/// let console = ConsoleSink::new(LogLevel::Debug).with_colors(false);
/// let logger = Logger::new(console).named("billing");
///
/// let request_logger = logger.with(vec![Field::new("request_id", "abc-123")]);
/// request_logger.info("charging card");
/// ```
#[derive(Clone)]
pub struct Logger {
    name: Option<String>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self {
            name: None,
            sink: Arc::new(sink),
        }
    }

    pub fn from_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { name: None, sink }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.sink.enabled(level)
    }

    /// Log a message with per-call fields
    pub fn log(&self, level: LogLevel, message: impl Into<String>, fields: &[Field]) -> Result<()> {
        self.log_at(level, message, fields, None)
    }

    /// Log a message recorded at `caller`
    pub fn log_at(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        fields: &[Field],
        caller: Option<Caller>,
    ) -> Result<()> {
        if !self.sink.enabled(level) {
            return Ok(());
        }

        let mut entry = LogEntry::new(level, message);
        if let Some(ref name) = self.name {
            entry = entry.with_logger_name(name.clone());
        }
        if let Some(caller) = caller {
            entry = entry.with_caller(caller);
        }

        self.sink.accept(&entry, fields)
    }

    /// Log a prebuilt entry
    pub fn write(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        if !self.sink.enabled(entry.level) {
            return Ok(());
        }
        self.sink.accept(entry, fields)
    }

    /// Derive a logger that adds `fields` to every entry
    #[must_use]
    pub fn with(&self, fields: Vec<Field>) -> Logger {
        Logger {
            name: self.name.clone(),
            sink: Arc::from(self.sink.with(fields)),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    fn log_or_report(&self, level: LogLevel, message: String) {
        if let Err(e) = self.log(level, message, &[]) {
            eprintln!("[TELEGRAM LOGGER ERROR] failed to write {} entry: {}", level, e);
        }
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Debug, message.into());
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Info, message.into());
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Warn, message.into());
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Error, message.into());
    }

    /// Log at fatal level. Unlike some frontends, this does not exit.
    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Fatal, message.into());
    }

    /// Log at panic level. Unlike some frontends, this does not panic.
    #[inline]
    pub fn panic(&self, message: impl Into<String>) {
        self.log_or_report(LogLevel::Panic, message.into());
    }
}
