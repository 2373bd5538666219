//! Per-destination delivery of a single entry

use super::{
    error::{LoggerError, Result},
    field::Field,
    format::{Formatter, ParseMode},
    level_policy::LevelPolicy,
    log_entry::LogEntry,
    metrics::RouterMetrics,
};
use crate::transport::{OutgoingMessage, Transport};
use std::sync::Arc;

/// Formats an entry once and sends it to every destination
///
/// Immutable after construction and shared by every delivery path of a
/// router: the caller's thread, spawned async deliveries and the drain loop.
pub(crate) struct Dispatcher {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) chat_ids: Vec<i64>,
    pub(crate) policy: LevelPolicy,
    pub(crate) formatter: Formatter,
    pub(crate) parse_mode: Option<ParseMode>,
    pub(crate) metrics: Arc<RouterMetrics>,
}

impl Dispatcher {
    /// Send `entry` to every chat, in order
    ///
    /// A failed chat does not stop the remaining ones. Returns the last
    /// failure, if any.
    pub(crate) fn deliver(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        let text = (self.formatter)(entry, fields);
        let silent = !self.policy.urgent(entry.level);

        let mut last_error = None;
        for &chat_id in &self.chat_ids {
            let message = OutgoingMessage::new(chat_id, text.clone())
                .silent(silent)
                .with_parse_mode(self.parse_mode);

            match self.transport.send(&message) {
                Ok(()) => {
                    self.metrics.record_delivered();
                }
                Err(e) => {
                    self.metrics.record_failed();
                    last_error = Some(LoggerError::delivery(chat_id, e.to_string()));
                }
            }
        }

        last_error.map_or(Ok(()), Err)
    }

    /// Deliver and report a failure to stderr instead of returning it
    ///
    /// Used by the background paths, which have nobody to return errors to.
    pub(crate) fn deliver_detached(&self, entry: &LogEntry, fields: &[Field], path: &str) {
        if let Err(e) = self.deliver(entry, fields) {
            eprintln!("[TELEGRAM LOGGER ERROR] {} delivery failed: {}", path, e);
        }
    }
}
