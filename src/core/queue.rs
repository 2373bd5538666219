//! Interval-batched delivery queue
//!
//! Producers push entries onto a bounded channel and block while it is full.
//! A single background thread drains the channel every time its ticker fires
//! and once more when its [`CancelToken`] fires, then exits.
//!
//! Drain loop lifecycle: `Started` -> `Draining` (final drain) -> `Stopped`.
//! The loop is started once per router and cannot be restarted.

use super::{
    cancel::{CancelReason, CancelToken},
    dispatch::Dispatcher,
    error::{LoggerError, Result},
    field::Field,
    log_entry::LogEntry,
};
use crossbeam_channel::{bounded, select, tick, Receiver, SendTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default number of entries the queue holds before producers block
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default time between two drains
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// How long a producer blocked on a full queue waits before rechecking
/// whether the queue was closed
const PUSH_RECHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Queue settings for [`crate::RouterBuilder::queue`]
///
/// # Example
///
/// ```
/// use rust_telegram_logger::{CancelToken, QueueOptions};
/// use std::time::Duration;
///
/// let shutdown = CancelToken::new();
/// let options = QueueOptions::new(shutdown.clone(), Duration::from_secs(10), 500);
/// assert_eq!(options.capacity(), 500);
/// ```
pub struct QueueOptions {
    cancel: CancelToken,
    interval: Duration,
    capacity: usize,
    ticker: Option<Receiver<Instant>>,
}

impl QueueOptions {
    pub fn new(cancel: CancelToken, interval: Duration, capacity: usize) -> Self {
        Self {
            cancel,
            interval,
            capacity,
            ticker: None,
        }
    }

    /// Drive drains from `ticker` instead of a wall-clock timer
    ///
    /// Every message received on `ticker` triggers one drain. If every sender
    /// of `ticker` is dropped, the loop only waits for cancellation.
    #[must_use]
    pub fn with_ticker(mut self, ticker: Receiver<Instant>) -> Self {
        self.ticker = Some(ticker);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(LoggerError::config("queue", "capacity must be greater than zero"));
        }
        if self.interval.is_zero() && self.ticker.is_none() {
            return Err(LoggerError::config("queue", "flush interval must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for QueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueOptions")
            .field("interval", &self.interval)
            .field("capacity", &self.capacity)
            .field("custom_ticker", &self.ticker.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Started,
    Draining,
    Stopped,
}

/// An entry waiting in the queue, with its fields already flattened
pub(crate) struct QueuedEntry {
    pub(crate) entry: LogEntry,
    pub(crate) fields: Vec<Field>,
}

pub(crate) struct DeliveryQueue {
    sender: Sender<QueuedEntry>,
    receiver: Receiver<QueuedEntry>,
    dispatcher: Arc<Dispatcher>,
    state: Arc<RwLock<DrainState>>,
    handle: Mutex<Option<JoinHandle<CancelReason>>>,
    capacity: usize,
}

impl DeliveryQueue {
    /// Create the queue and start its drain loop
    pub(crate) fn start(options: QueueOptions, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        options.validate()?;

        let QueueOptions {
            cancel,
            interval,
            capacity,
            ticker,
        } = options;

        let (sender, receiver) = bounded(capacity);
        let ticker = ticker.unwrap_or_else(|| tick(interval));
        let state = Arc::new(RwLock::new(DrainState::Started));

        let drain_loop = DrainLoop {
            receiver: receiver.clone(),
            ticker,
            cancel,
            dispatcher: Arc::clone(&dispatcher),
            state: Arc::clone(&state),
        };
        let handle = thread::Builder::new()
            .name("telegram-drain".to_string())
            .spawn(move || drain_loop.run())?;

        Ok(Self {
            sender,
            receiver,
            dispatcher,
            state,
            handle: Mutex::new(Some(handle)),
            capacity,
        })
    }

    /// Enqueue an entry, blocking while the queue is full
    ///
    /// Fails once shutdown has begun. A blocked producer holds the state read
    /// lock for one `PUSH_RECHECK_INTERVAL` at a time, so every successful
    /// push lands before the final drain starts.
    pub(crate) fn push(&self, mut item: QueuedEntry) -> Result<()> {
        loop {
            let state = self.state.read();
            if *state != DrainState::Started {
                return Err(LoggerError::ChannelSendError);
            }
            match self.sender.send_timeout(item, PUSH_RECHECK_INTERVAL) {
                Ok(()) => {
                    self.dispatcher.metrics.record_enqueued();
                    return Ok(());
                }
                Err(SendTimeoutError::Timeout(returned)) => item = returned,
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err(LoggerError::ChannelSendError)
                }
            }
        }
    }

    /// Drain the entries present right now
    pub(crate) fn drain(&self) -> usize {
        drain_pending(&self.receiver, &self.dispatcher)
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn state(&self) -> DrainState {
        *self.state.read()
    }

    /// Wait for the drain loop to exit
    ///
    /// Blocks until the loop's token fires. Returns `None` if the loop was
    /// already joined.
    pub(crate) fn join(&self) -> Result<Option<CancelReason>> {
        let Some(handle) = self.handle.lock().take() else {
            return Ok(None);
        };
        handle
            .join()
            .map(Some)
            .map_err(|_| LoggerError::other("drain loop panicked"))
    }
}

enum Wake {
    Tick,
    TickerClosed,
    Cancelled,
    DeadlineExceeded,
}

struct DrainLoop {
    receiver: Receiver<QueuedEntry>,
    ticker: Receiver<Instant>,
    cancel: CancelToken,
    dispatcher: Arc<Dispatcher>,
    state: Arc<RwLock<DrainState>>,
}

impl DrainLoop {
    fn run(self) -> CancelReason {
        let deadline = self.cancel.deadline_timer();

        loop {
            let wake = select! {
                recv(self.ticker) -> msg => match msg {
                    Ok(_) => Wake::Tick,
                    Err(_) => Wake::TickerClosed,
                },
                recv(self.cancel.fired()) -> _ => Wake::Cancelled,
                recv(deadline) -> _ => Wake::DeadlineExceeded,
            };

            match wake {
                Wake::Tick => {
                    drain_pending(&self.receiver, &self.dispatcher);
                }
                Wake::TickerClosed => {
                    self.cancel.wait();
                    break;
                }
                Wake::Cancelled => break,
                Wake::DeadlineExceeded => {
                    self.cancel.fire(CancelReason::DeadlineExceeded);
                    break;
                }
            }
        }

        // Waits for blocked producers to release the read lock; no push
        // succeeds after this
        *self.state.write() = DrainState::Draining;
        drain_pending(&self.receiver, &self.dispatcher);
        *self.state.write() = DrainState::Stopped;

        self.cancel.reason().unwrap_or(CancelReason::Cancelled)
    }
}

/// Send every entry observed in the queue at call time
///
/// Bounded by the length seen on entry, so it terminates even while
/// producers keep pushing. Failed sends are reported and not retried.
fn drain_pending(receiver: &Receiver<QueuedEntry>, dispatcher: &Dispatcher) -> usize {
    let observed = receiver.len();
    let mut drained = 0;

    for _ in 0..observed {
        let Ok(item) = receiver.try_recv() else {
            break;
        };
        dispatcher.metrics.record_drained();
        dispatcher.deliver_detached(&item.entry, &item.fields, "queued");
        drained += 1;
    }

    drained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let options = QueueOptions::new(CancelToken::new(), Duration::from_secs(1), 0);
        assert!(options.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_zero_interval_rejected_without_ticker() {
        let options = QueueOptions::new(CancelToken::new(), Duration::ZERO, 10);
        assert!(options.validate().is_err());

        let (_tx, rx) = crossbeam_channel::unbounded();
        let options = QueueOptions::new(CancelToken::new(), Duration::ZERO, 10).with_ticker(rx);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_debug() {
        let options = QueueOptions::new(CancelToken::new(), Duration::from_millis(250), 8);
        let debug = format!("{:?}", options);
        assert!(debug.contains("capacity: 8"));
        assert!(debug.contains("custom_ticker: false"));
    }
}
