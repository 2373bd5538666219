//! Entry router: level gating, field enrichment and delivery scheduling
//!
//! A [`TelegramRouter`] decides for every entry whether it is delivered, how
//! urgently, and by which strategy:
//!
//! - **Sync**: sent on the caller's thread; the last per-chat error is returned.
//! - **Async**: sent on a new thread per entry; errors go to stderr only.
//!   Nothing bounds the number of concurrent deliveries and nothing is
//!   retried: each entry is delivered at most once.
//! - **Queued**: pushed onto a bounded queue that a background thread drains
//!   on an interval. Pushing blocks while the queue is full.

use super::{
    cancel::CancelReason,
    dispatch::Dispatcher,
    error::{LoggerError, Result},
    field::Field,
    format::{default_format, Formatter, MessageLayout, ParseMode},
    level_policy::{LevelPolicy, Notification},
    log_entry::LogEntry,
    log_level::{LevelSet, LogLevel},
    metrics::RouterMetrics,
    queue::{DeliveryQueue, DrainState, QueueOptions, QueuedEntry},
    sink::LogSink,
};
use crate::transport::{TelegramTransport, Transport, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How accepted entries are handed to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Sync,
    #[default]
    Async,
    Queued,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Sync => write!(f, "sync"),
            DeliveryMode::Async => write!(f, "async"),
            DeliveryMode::Queued => write!(f, "queued"),
        }
    }
}

enum Delivery {
    Sync,
    Async,
    Queued(DeliveryQueue),
}

struct RouterShared {
    dispatcher: Arc<Dispatcher>,
    delivery: Delivery,
}

/// Log sink that delivers entries to one or more Telegram chats
///
/// Cloning is cheap. Handles derived with [`TelegramRouter::with`] share the
/// configuration, transport, metrics and queue of their parent but carry
/// their own inherited fields.
///
/// # Example
///
/// ```no_run
/// use rust_telegram_logger::prelude::*;
///
/// let router = TelegramRouter::builder("123456:ABC-DEF", vec![-1001234567890])
///     .level(LogLevel::Error)
///     .sync()
///     .build()?;
///
/// let entry = LogEntry::new(LogLevel::Error, "payment provider unreachable");
/// router.accept(&entry, &[Field::new("provider", "acme")])?;
/// # Ok::<(), LoggerError>(())
/// ```
#[derive(Clone)]
pub struct TelegramRouter {
    shared: Arc<RouterShared>,
    // Never mutated; `with` builds a new slice
    inherited: Arc<[Field]>,
}

impl TelegramRouter {
    pub fn builder(token: impl Into<String>, chat_ids: impl Into<Vec<i64>>) -> RouterBuilder {
        RouterBuilder::new(token, chat_ids)
    }

    /// Whether entries at `level` are delivered at all
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.shared.dispatcher.policy.eligible(level)
    }

    /// Route one entry
    ///
    /// `fields` are the per-call fields; the handle's inherited fields are
    /// appended after them. Ineligible entries are ignored.
    pub fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        if !self.enabled(entry.level) {
            return Ok(());
        }

        let fields = self.resolve_fields(fields);

        match &self.shared.delivery {
            Delivery::Sync => self.shared.dispatcher.deliver(entry, &fields),
            Delivery::Async => {
                self.spawn_delivery(entry.clone(), fields);
                Ok(())
            }
            Delivery::Queued(queue) => queue.push(QueuedEntry {
                entry: entry.clone(),
                fields,
            }),
        }
    }

    /// Derive a handle whose inherited fields are this handle's followed by
    /// `fields`
    #[must_use]
    pub fn with(&self, fields: Vec<Field>) -> TelegramRouter {
        let mut inherited = Vec::with_capacity(self.inherited.len() + fields.len());
        inherited.extend_from_slice(&self.inherited);
        inherited.extend(fields);

        TelegramRouter {
            shared: Arc::clone(&self.shared),
            inherited: inherited.into(),
        }
    }

    /// Send everything currently queued before returning
    ///
    /// Only entries present when the call starts are drained, so this returns
    /// even while other threads keep logging. No-op outside queued mode.
    pub fn flush(&self) -> Result<()> {
        if let Delivery::Queued(queue) = &self.shared.delivery {
            queue.drain();
        }
        Ok(())
    }

    pub fn inherited_fields(&self) -> &[Field] {
        &self.inherited
    }

    pub fn mode(&self) -> DeliveryMode {
        match self.shared.delivery {
            Delivery::Sync => DeliveryMode::Sync,
            Delivery::Async => DeliveryMode::Async,
            Delivery::Queued(_) => DeliveryMode::Queued,
        }
    }

    pub fn policy(&self) -> &LevelPolicy {
        &self.shared.dispatcher.policy
    }

    pub fn chat_ids(&self) -> &[i64] {
        &self.shared.dispatcher.chat_ids
    }

    pub fn metrics(&self) -> &RouterMetrics {
        &self.shared.dispatcher.metrics
    }

    /// Entries waiting in the queue; always 0 outside queued mode
    pub fn queue_len(&self) -> usize {
        match &self.shared.delivery {
            Delivery::Queued(queue) => queue.len(),
            _ => 0,
        }
    }

    pub fn queue_capacity(&self) -> Option<usize> {
        match &self.shared.delivery {
            Delivery::Queued(queue) => Some(queue.capacity()),
            _ => None,
        }
    }

    /// Lifecycle state of the drain loop; `None` outside queued mode
    pub fn drain_state(&self) -> Option<DrainState> {
        match &self.shared.delivery {
            Delivery::Queued(queue) => Some(queue.state()),
            _ => None,
        }
    }

    /// Wait for the drain loop to finish and return why it stopped
    ///
    /// Blocks until the queue's cancel token fires. Returns `Ok(None)` outside
    /// queued mode or when the loop was already joined through any handle.
    pub fn join_drain_loop(&self) -> Result<Option<CancelReason>> {
        match &self.shared.delivery {
            Delivery::Queued(queue) => queue.join(),
            _ => Ok(None),
        }
    }

    fn resolve_fields(&self, fields: &[Field]) -> Vec<Field> {
        let mut resolved = Vec::with_capacity(fields.len() + self.inherited.len());
        resolved.extend_from_slice(fields);
        resolved.extend_from_slice(&self.inherited);
        resolved
    }

    fn spawn_delivery(&self, entry: LogEntry, fields: Vec<Field>) {
        let dispatcher = Arc::clone(&self.shared.dispatcher);
        let spawned = thread::Builder::new()
            .name("telegram-send".to_string())
            .spawn(move || dispatcher.deliver_detached(&entry, &fields, "async"));

        match spawned {
            Ok(_) => {
                self.metrics().record_spawned();
            }
            Err(e) => {
                eprintln!("[TELEGRAM LOGGER ERROR] failed to spawn async delivery: {}", e);
            }
        }
    }
}

impl LogSink for TelegramRouter {
    fn enabled(&self, level: LogLevel) -> bool {
        TelegramRouter::enabled(self, level)
    }

    fn accept(&self, entry: &LogEntry, fields: &[Field]) -> Result<()> {
        TelegramRouter::accept(self, entry, fields)
    }

    fn with(&self, fields: Vec<Field>) -> Box<dyn LogSink> {
        Box::new(TelegramRouter::with(self, fields))
    }

    fn flush(&self) -> Result<()> {
        TelegramRouter::flush(self)
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

impl fmt::Debug for TelegramRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramRouter")
            .field("mode", &self.mode())
            .field("chat_ids", &self.chat_ids())
            .field("policy", self.policy())
            .field("inherited", &self.inherited.len())
            .finish()
    }
}

/// Builder for constructing a [`TelegramRouter`] with a fluent API
///
/// Options are only validated by [`RouterBuilder::build`]: first the token,
/// then the chat ids, then the delivery mode and queue settings. No thread is
/// started unless every check passes.
///
/// # Example
///
/// ```no_run
/// use rust_telegram_logger::prelude::*;
/// use std::time::Duration;
///
/// let shutdown = CancelToken::new();
/// let router = TelegramRouter::builder("123456:ABC-DEF", vec![-1001234567890])
///     .level(LogLevel::Warn)
///     .notify_on([LogLevel::Error, LogLevel::Fatal])
///     .parse_mode(ParseMode::Html)
///     .queue(QueueOptions::new(shutdown.clone(), Duration::from_secs(10), 1000))
///     .build()?;
///
/// // ... on shutdown
/// shutdown.cancel();
/// router.join_drain_loop()?;
/// # Ok::<(), LoggerError>(())
/// ```
pub struct RouterBuilder {
    token: String,
    chat_ids: Vec<i64>,
    policy: LevelPolicy,
    mode_selections: Vec<DeliveryMode>,
    queue: Option<QueueOptions>,
    formatter: Option<Formatter>,
    parse_mode: Option<ParseMode>,
    transport: Option<Arc<dyn Transport>>,
    api_url: String,
    request_timeout: Duration,
}

impl RouterBuilder {
    pub fn new(token: impl Into<String>, chat_ids: impl Into<Vec<i64>>) -> Self {
        Self {
            token: token.into(),
            chat_ids: chat_ids.into(),
            policy: LevelPolicy::default(),
            mode_selections: Vec::new(),
            queue: None,
            formatter: None,
            parse_mode: None,
            transport: None,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Deliver entries at `level` and above
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.policy.set_threshold(level);
        self
    }

    /// Deliver entries at exactly `level`, replacing any threshold
    #[must_use = "builder methods return a new value"]
    pub fn exact_level(mut self, level: LogLevel) -> Self {
        self.policy.set_exact(level);
        self
    }

    /// Send on the caller's thread and return delivery errors
    #[must_use = "builder methods return a new value"]
    pub fn sync(mut self) -> Self {
        self.mode_selections.push(DeliveryMode::Sync);
        self
    }

    /// Send on a new thread per entry (the default)
    #[must_use = "builder methods return a new value"]
    pub fn asynchronous(mut self) -> Self {
        self.mode_selections.push(DeliveryMode::Async);
        self
    }

    /// Send in batches from a bounded queue
    ///
    /// Cannot be combined with [`RouterBuilder::sync`] or
    /// [`RouterBuilder::asynchronous`].
    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, options: QueueOptions) -> Self {
        self.mode_selections.push(DeliveryMode::Queued);
        self.queue = Some(options);
        self
    }

    /// Deliver every message silently
    #[must_use = "builder methods return a new value"]
    pub fn disable_notification(mut self) -> Self {
        self.policy.set_notification(Notification::Suppressed);
        self
    }

    /// Deliver silently except for the listed levels
    ///
    /// An empty list silences every message.
    #[must_use = "builder methods return a new value"]
    pub fn notify_on<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        let levels: LevelSet = levels.into_iter().collect();
        self.policy.set_notification(Notification::OnLevels(levels));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    /// Use a custom message formatter
    #[must_use = "builder methods return a new value"]
    pub fn formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&LogEntry, &[Field]) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Use one of the built-in layouts
    #[must_use = "builder methods return a new value"]
    pub fn layout(mut self, layout: MessageLayout) -> Self {
        self.formatter = Some(layout.formatter());
        self
    }

    /// Send through `transport` instead of the Bot API client
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Bot API base URL for the default transport
    #[must_use = "builder methods return a new value"]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the router
    pub fn build(self) -> Result<TelegramRouter> {
        if self.token.is_empty() {
            return Err(LoggerError::missing_token());
        }
        if self.chat_ids.is_empty() {
            return Err(LoggerError::missing_chat_ids());
        }

        let mode = resolve_mode(&self.mode_selections)?;
        if let Some(ref options) = self.queue {
            options.validate()?;
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(TelegramTransport::with_options(
                self.token,
                self.api_url,
                self.request_timeout,
            )?),
        };

        let formatter: Formatter = match self.formatter {
            Some(formatter) => formatter,
            None => Arc::new(default_format),
        };

        let dispatcher = Arc::new(Dispatcher {
            transport,
            chat_ids: self.chat_ids,
            policy: self.policy,
            formatter,
            parse_mode: self.parse_mode,
            metrics: Arc::new(RouterMetrics::new()),
        });

        let delivery = match (mode, self.queue) {
            (DeliveryMode::Sync, _) => Delivery::Sync,
            (DeliveryMode::Async, _) => Delivery::Async,
            (DeliveryMode::Queued, Some(options)) => {
                Delivery::Queued(DeliveryQueue::start(options, Arc::clone(&dispatcher))?)
            }
            (DeliveryMode::Queued, None) => {
                return Err(LoggerError::config("queue", "queued delivery requires queue options"))
            }
        };

        Ok(TelegramRouter {
            shared: Arc::new(RouterShared {
                dispatcher,
                delivery,
            }),
            inherited: Arc::from(Vec::new()),
        })
    }
}

/// Pick the delivery mode from the explicit selections
///
/// Queued delivery excludes every other selection. Between sync and async,
/// the last selection wins. Without selections the mode is async.
fn resolve_mode(selections: &[DeliveryMode]) -> Result<DeliveryMode> {
    let queued = selections.contains(&DeliveryMode::Queued);

    if queued {
        if let Some(other) = selections.iter().find(|mode| **mode != DeliveryMode::Queued) {
            return Err(LoggerError::mode_conflict(other, DeliveryMode::Queued));
        }
        return Ok(DeliveryMode::Queued);
    }

    Ok(selections.last().copied().unwrap_or_default())
}
