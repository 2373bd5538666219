//! Cancellation signal for background drain loops
//!
//! A [`CancelToken`] is shared between the code that owns a router's
//! lifetime and the router's drain loop. Cancelling it (explicitly, or by
//! letting its deadline pass) makes the drain loop perform one final drain
//! and exit with the [`CancelReason`].

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a token fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// [`CancelToken::cancel`] was called
    Cancelled,
    /// The token's deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Cloneable cancellation handle
///
/// All clones observe the same state. Once fired, a token stays fired and
/// keeps the first reason it recorded.
///
/// # Example
///
/// ```
/// use rust_telegram_logger::{CancelReason, CancelToken};
///
/// let token = CancelToken::new();
/// let observer = token.clone();
///
/// token.cancel();
/// assert_eq!(observer.wait(), CancelReason::Cancelled);
/// ```
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    // Dropping the sender disconnects `fired`, which wakes every receiver
    trigger: Mutex<Option<Sender<()>>>,
    fired: Receiver<()>,
    reason: Mutex<Option<CancelReason>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A token that fires with [`CancelReason::DeadlineExceeded`] at `deadline`
    /// unless cancelled earlier
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(Instant::now() + timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        let (trigger, fired) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                trigger: Mutex::new(Some(trigger)),
                fired,
                reason: Mutex::new(None),
                deadline,
            }),
        }
    }

    pub fn cancel(&self) {
        self.fire(CancelReason::Cancelled);
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// The reason the token fired, or `None` while it is still live
    pub fn reason(&self) -> Option<CancelReason> {
        if let Some(reason) = *self.inner.reason.lock() {
            return Some(reason);
        }
        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.fire(CancelReason::DeadlineExceeded);
                *self.inner.reason.lock()
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Block until the token fires
    pub fn wait(&self) -> CancelReason {
        crossbeam_channel::select! {
            recv(self.inner.fired) -> _ => {}
            recv(self.deadline_timer()) -> _ => self.fire(CancelReason::DeadlineExceeded),
        }
        self.reason().unwrap_or(CancelReason::Cancelled)
    }

    /// Channel that disconnects when the token is cancelled
    pub(crate) fn fired(&self) -> &Receiver<()> {
        &self.inner.fired
    }

    /// Channel that delivers once the deadline passes; never delivers when the
    /// token has no deadline
    pub(crate) fn deadline_timer(&self) -> Receiver<Instant> {
        match self.inner.deadline {
            Some(deadline) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        }
    }

    pub(crate) fn fire(&self, reason: CancelReason) {
        {
            let mut current = self.inner.reason.lock();
            if current.is_none() {
                *current = Some(reason);
            }
        }
        drop(self.inner.trigger.lock().take());
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("reason", &*self.inner.reason.lock())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}
