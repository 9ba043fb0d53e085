use std::sync::atomic::{AtomicU64, Ordering};

/// Optional observability counters, gated by [`Config::enable_metrics`](crate::Config::enable_metrics).
///
/// The core reserve/commit/peek/consume path never logs: this is a
/// zero-copy, wait-free structure, and a tracing call on the fast path
/// would defeat the point of it. The teacher crate's answer to this is
/// plain atomic counters read through a non-atomic snapshot, and this crate
/// follows the same answer rather than bolting on a logging dependency the
/// teacher itself avoids in its hot paths.
#[derive(Debug, Default)]
pub struct Metrics {
    reservations_granted: AtomicU64,
    reservations_short: AtomicU64,
    elements_committed: AtomicU64,
    wraps: AtomicU64,
    peeks_nonempty: AtomicU64,
    elements_consumed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_reservation(&self, requested: usize, granted: usize) {
        self.reservations_granted.fetch_add(1, Ordering::Relaxed);
        if granted < requested {
            self.reservations_short.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_commit(&self, count: usize, wrapped: bool) {
        self.elements_committed
            .fetch_add(count as u64, Ordering::Relaxed);
        if wrapped {
            self.wraps.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_peek(&self, len: usize) {
        if len > 0 {
            self.peeks_nonempty.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_consume(&self, count: usize) {
        self.elements_consumed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Takes a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reservations_granted: self.reservations_granted.load(Ordering::Relaxed),
            reservations_short: self.reservations_short.load(Ordering::Relaxed),
            elements_committed: self.elements_committed.load(Ordering::Relaxed),
            wraps: self.wraps.load(Ordering::Relaxed),
            peeks_nonempty: self.peeks_nonempty.load(Ordering::Relaxed),
            elements_consumed: self.elements_consumed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`Metrics`], safe to read without further
/// synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub reservations_granted: u64,
    pub reservations_short: u64,
    pub elements_committed: u64,
    pub wraps: u64,
    pub peeks_nonempty: u64,
    pub elements_consumed: u64,
}
