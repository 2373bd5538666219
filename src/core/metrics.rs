//! Router metrics for observability
//!
//! Counters for per-destination sends and queue traffic. Background delivery
//! failures are never returned to the caller, so these counters are the only
//! place they show up besides stderr.

use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery counters shared by a router and all handles derived from it
///
/// # Example
///
/// ```
/// use rust_telegram_logger::RouterMetrics;
///
/// let metrics = RouterMetrics::new();
///
/// metrics.record_delivered();
/// metrics.record_failed();
///
/// assert_eq!(metrics.delivered_count(), 1);
/// assert_eq!(metrics.failed_count(), 1);
/// ```
#[derive(Debug)]
pub struct RouterMetrics {
    /// Messages accepted by the transport, counted per destination
    delivered: AtomicU64,

    /// Messages the transport rejected, counted per destination
    failed: AtomicU64,

    /// Entries pushed onto the delivery queue
    enqueued: AtomicU64,

    /// Entries taken off the delivery queue
    drained: AtomicU64,

    /// Fire-and-forget deliveries started
    spawned: AtomicU64,
}

impl RouterMetrics {
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            enqueued: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            spawned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn drained_count(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn spawned_count(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Entries enqueued but not yet drained
    pub fn pending_count(&self) -> u64 {
        self.enqueued_count().saturating_sub(self.drained_count())
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_drained(&self) -> u64 {
        self.drained.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_spawned(&self) -> u64 {
        self.spawned.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate of per-destination sends as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been sent.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.delivered_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.enqueued.store(0, Ordering::Relaxed);
        self.drained.store(0, Ordering::Relaxed);
        self.spawned.store(0, Ordering::Relaxed);
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RouterMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered_count()),
            failed: AtomicU64::new(self.failed_count()),
            enqueued: AtomicU64::new(self.enqueued_count()),
            drained: AtomicU64::new(self.drained_count()),
            spawned: AtomicU64::new(self.spawned_count()),
        }
    }
}
