//! Sink trait for log delivery backends

use super::{error::Result, field::Field, log_entry::LogEntry, log_level::LogLevel};

/// A logging backend that a frontend can write entries to
///
/// Frontends call [`LogSink::enabled`] before materializing an entry, so a
/// sink that rejects a level never sees entries at that level. Several sinks
/// can be combined with [`crate::core::Tee`].
pub trait LogSink: Send + Sync {
    /// Whether entries at `level` would be accepted
    fn enabled(&self, level: LogLevel) -> bool;

    /// Write one entry with its per-call fields
    fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()>;

    /// Derive a sink that appends `fields` to every entry it accepts
    ///
    /// Deriving never changes `self`.
    fn with(&self, fields: Vec<Field>) -> Box<dyn LogSink>;

    /// Push out anything buffered
    fn flush(&self) -> Result<()>;

    fn name(&self) -> &str;
}
