use std::cell::{Cell, UnsafeCell};

use crate::backoff::Backoff;
use crate::config::Config;
use crate::cursor::{AtomicCursor, Cursor};
use crate::invariants::{
    debug_assert_index_bounds, debug_assert_no_reservation_outstanding, debug_assert_nonempty_storage,
    debug_assert_wrapped_order, maybe_assert,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::peek::PeekView;
use crate::reservation::Reservation;

/// A fixed-capacity, single-producer single-consumer bipartite circular
/// buffer over a caller-supplied backing array.
///
/// # The three indices
///
/// `head` (next write position), `tail` (next read position) and `mark`
/// (the high-water line of the previous lap) together describe which of
/// two configurations the buffer is in:
///
/// - **Linear** (`head >= tail`): the readable region is `[tail, head)`;
///   `mark` is unused.
/// - **Wrapped** (`head < tail`): the producer has looped back to the
///   start because there wasn't room at the end. The readable region is
///   `[tail, mark)` — `mark` freezes where the previous lap's data ends —
///   and once the consumer's `tail` reaches `mark`, `tail` collapses back
///   to `0` and the buffer returns to the linear configuration. The
///   collapse is detected in two places: in `consume`, when a consume call
///   lands exactly on `mark`, and lazily in `peek`, for the case where the
///   previous lap's high region was already empty at the moment the
///   producer wrapped (so no consume call against it ever ran).
///
/// One array slot is never used (the sentinel): without it, `head == tail`
/// could mean either "empty" or "completely full", and the buffer couldn't
/// tell the two apart. Usable capacity is therefore `capacity() - 1`.
///
/// # Ordering
///
/// Every reservation/commit and peek/consume pair around the shared
/// `head`/`tail` cursors uses the ordering the teacher crate's `Ring` uses
/// around its own sequence counters: the producer's `head` store is
/// `Release` and the consumer's `head` load is `Acquire` (so a wrap's
/// `mark` write, sequenced before it in program order, is visible once the
/// consumer observes the new `head`); symmetrically the consumer's `tail`
/// store is `Release` and the producer's `tail` load is `Acquire`. `mark`
/// itself is written and read with `Relaxed` ordering on both sides,
/// because it only ever needs to piggyback on the adjacent `head`/`tail`
/// synchronization, never its own.
///
/// `C` selects the cursor implementation: [`AtomicCursor`] (the default)
/// for genuinely concurrent producer/consumer threads, or
/// [`PlainCursor`](crate::PlainCursor) when the caller statically knows
/// both roles run on the same thread and wants the atomics compiled away.
pub struct Buffer<'buf, T, C: Cursor = AtomicCursor> {
    storage: UnsafeCell<&'buf mut [T]>,
    capacity: usize,
    head: C,
    tail: C,
    mark: C,
    reservation_outstanding: Cell<bool>,
    metrics: Metrics,
    config: Config,
}

// SAFETY: all cross-thread communication goes through `head`/`tail`/`mark`
// (via `Cursor`'s documented orderings) or `reservation_outstanding`, which
// is touched only by the producer-side methods and is therefore never
// accessed from two threads at once under the single-producer discipline
// spec.md assumes. `storage` is accessed through non-overlapping spans
// handed out by `reserve_largest`/`peek`, never both ends at once.
unsafe impl<'buf, T: Send, C: Cursor + Sync> Sync for Buffer<'buf, T, C> {}
unsafe impl<'buf, T: Send, C: Cursor + Send> Send for Buffer<'buf, T, C> {}

impl<'buf, T, C: Cursor> Buffer<'buf, T, C> {
    /// Binds a `Buffer` to the given backing array. The array's length is
    /// the buffer's capacity for the lifetime of the binding; usable
    /// capacity is one less (the sentinel slot).
    ///
    /// # Panics
    ///
    /// Panics (in safety-checked builds) if `storage` is empty.
    pub fn new(storage: &'buf mut [T]) -> Self {
        Self::with_config(storage, Config::default())
    }

    /// As [`new`](Self::new), with an explicit [`Config`].
    pub fn with_config(storage: &'buf mut [T], config: Config) -> Self {
        debug_assert_nonempty_storage!(storage.len());
        let capacity = storage.len();
        Self {
            storage: UnsafeCell::new(storage),
            capacity,
            head: C::new(0),
            tail: C::new(0),
            mark: C::new(capacity),
            reservation_outstanding: Cell::new(false),
            metrics: Metrics::new(),
            config,
        }
    }

    /// The length of the backing array, including the sentinel slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of committed, not-yet-consumed elements.
    pub fn committed(&self) -> usize {
        let h = self.head.load_relaxed();
        let t = self.tail.load_relaxed();
        if h >= t {
            h - t
        } else {
            let m = self.mark.load_relaxed();
            (m - t) + h
        }
    }

    /// True if there is nothing committed to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.committed() == 0
    }

    /// This buffer's configuration.
    #[inline]
    pub fn config(&self) -> Config {
        self.config
    }

    /// A point-in-time snapshot of the observability counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Restores the buffer to its freshly-constructed, empty state.
    ///
    /// Requires `&mut self`: the borrow checker already rules out a `reset`
    /// racing a live [`Reservation`], since a `Reservation` holds a shared
    /// borrow of the buffer it came from and can't coexist with an
    /// exclusive one. The outstanding-reservation check below is therefore
    /// a backstop, not the only guard.
    pub fn reset(&mut self) {
        maybe_assert!(
            !self.reservation_outstanding.get(),
            "{}",
            crate::error::ContractViolation::ResetWhileOutstanding
        );
        self.head.store_relaxed(0);
        self.tail.store_relaxed(0);
        self.mark.store_relaxed(self.capacity);
        self.reservation_outstanding.set(false);
    }

    /// Grants the largest reservation available, up to `requested`
    /// elements. Never fails; a full buffer yields a zero-length
    /// reservation.
    ///
    /// # Panics
    ///
    /// Panics (in safety-checked builds) if a reservation is already
    /// outstanding on this buffer (spec.md's single-outstanding-reservation
    /// discipline).
    pub fn reserve_largest(&self, requested: usize) -> Reservation<'_, 'buf, T, C> {
        debug_assert_no_reservation_outstanding!(self.reservation_outstanding.get());
        self.reservation_outstanding.set(true);

        let h = self.head.load_relaxed();
        let t = self.tail.load_acquire();

        let (start, length, mark_base, mark_shift) = if h >= t {
            // Linear configuration: room at the end, or wrap to the start.
            //
            // When `tail` is still at 0, the end of the array and the
            // wraparound target are the same slot, so the sentinel has to
            // be reserved here too (`capacity - 1 - h`) or a first lap could
            // fill the entire array and make a later `head == tail` mean
            // both "empty" and "full".
            let end_gap = if t > 0 { self.capacity - h } else { self.capacity - 1 - h };
            if end_gap >= requested {
                (h, requested, 0, false)
            } else if t > 0 {
                (0, requested.min(t - 1), h, true)
            } else {
                // `tail == 0`: wrapping now would immediately catch up to
                // unread data at the front, so wrap is disallowed. Return
                // whatever is left before the physical end instead of the
                // short-circuited zero a wrap attempt would give.
                (h, end_gap, 0, false)
            }
        } else {
            // Wrapped configuration: bounded by tail, minus the sentinel gap.
            let avail = t - h - 1;
            (h, requested.min(avail), 0, false)
        };

        debug_assert_index_bounds!("reservation start", start, self.capacity);
        debug_assert_index_bounds!("reservation end", start + length, self.capacity);
        if self.config.enable_metrics {
            self.metrics.record_reservation(requested, length);
        }

        // SAFETY: `[start, start + length)` lies within `storage` (checked
        // above) and does not overlap the region handed out by any
        // concurrently-readable `PeekView`, since that region ends at
        // `tail` (linear) or `mark` (wrapped) and this span begins at or
        // after `head`, which the wrapped/linear branch above keeps at
        // least one sentinel slot clear of `tail`.
        let slice = unsafe {
            let base = (*self.storage.get()).as_mut_ptr();
            std::slice::from_raw_parts_mut(base.add(start), length)
        };
        Reservation::new(slice, self, start, mark_base, mark_shift)
    }

    /// Grants a reservation of exactly `requested` elements, or `None` if
    /// that much contiguous space isn't currently available. On failure,
    /// no index changes and nothing becomes observable: the candidate
    /// reservation is simply dropped, which is always a no-op short of a
    /// `commit`.
    pub fn reserve_exact(&self, requested: usize) -> Option<Reservation<'_, 'buf, T, C>> {
        let reservation = self.reserve_largest(requested);
        if reservation.len() == requested {
            Some(reservation)
        } else {
            None
        }
    }

    /// As [`reserve_exact`](Self::reserve_exact), but spins with [`Backoff`]
    /// until the full `requested` span becomes available or the backoff gives
    /// up, whichever comes first.
    ///
    /// This is not part of the core contract (spec.md §5: "callers that
    /// require space implement their own wait ... outside this spec"); it is
    /// the same opt-in convenience the teacher crate offers around its own
    /// non-blocking `reserve` as `reserve_with_backoff`. Still wait-free in
    /// the sense that it never parks a thread; it simply bounds how long it
    /// busy-polls before giving up and returning `None`.
    pub fn reserve_exact_with_backoff(&self, requested: usize) -> Option<Reservation<'_, 'buf, T, C>> {
        let mut backoff = Backoff::new();
        loop {
            if let Some(r) = self.reserve_exact(requested) {
                return Some(r);
            }
            if backoff.is_completed() {
                return None;
            }
            backoff.snooze();
        }
    }

    pub(crate) fn commit_internal(&self, start: usize, mark_base: usize, mark_shift: bool, count: usize) {
        if count > 0 {
            if mark_shift {
                self.mark.store_relaxed(mark_base);
            }
            let new_head = start + count;
            debug_assert_index_bounds!("new head", new_head, self.capacity);
            debug_assert_wrapped_order!(new_head, self.tail.load_relaxed(), self.mark.load_relaxed());
            self.head.store_release(new_head);
            if self.config.enable_metrics {
                self.metrics.record_commit(count, mark_shift);
            }
        }
        self.reservation_outstanding.set(false);
    }

    pub(crate) fn clear_reservation_outstanding(&self) {
        self.reservation_outstanding.set(false);
    }

    /// Returns a snapshot of the currently-readable, contiguous region.
    ///
    /// A fresh `peek` may be taken at any time, even while an earlier
    /// [`PeekView`] is still alive: neither mutates anything, so they
    /// simply describe the readable region as it stood when each was
    /// taken.
    pub fn peek(&self) -> PeekView<'_, 'buf, T, C> {
        let mut t = self.tail.load_relaxed();
        let h = self.head.load_acquire();

        let (len, wrap, mark_snapshot) = if h >= t {
            (h - t, false, 0)
        } else {
            let m = self.mark.load_relaxed();
            debug_assert_wrapped_order!(h, t, m);
            if t >= m {
                // The previous lap's high region was already fully drained
                // by the time this wrap was committed (no consume ever ran
                // against it to trigger the collapse in `consume_internal`).
                // Collapse here instead and read the new lap at the front.
                t = 0;
                self.tail.store_release(0);
                (h, false, 0)
            } else {
                (m - t, true, m)
            }
        };

        if self.config.enable_metrics {
            self.metrics.record_peek(len);
        }

        // SAFETY: `[t, t + len)` lies within `storage` and is disjoint from
        // any outstanding `Reservation`'s span for the same reason as in
        // `reserve_largest`.
        let slice = unsafe {
            let base = (*self.storage.get()).as_ptr();
            std::slice::from_raw_parts(base.add(t), len)
        };
        PeekView::new(slice, self, t, wrap, mark_snapshot)
    }

    pub(crate) fn consume_internal(&self, tail_snapshot: usize, wrap: bool, mark_snapshot: usize, count: usize) {
        if count == 0 {
            return;
        }
        let new_tail = tail_snapshot + count;
        if wrap && new_tail == mark_snapshot {
            // Consumed the entire high region: collapse back to linear.
            self.tail.store_release(0);
        } else {
            debug_assert_index_bounds!("new tail", new_tail, self.capacity);
            self.tail.store_release(new_tail);
        }
        if self.config.enable_metrics {
            self.metrics.record_consume(count);
        }
    }
}

impl<'buf, T: Copy, C: Cursor> Buffer<'buf, T, C> {
    /// Copies as much of `data` as fits into a single reservation and
    /// commits it in one call. Mirrors the teacher crate's `Ring::push`,
    /// adapted to bip-buffer's possibly-partial grants.
    pub fn try_write(&self, data: &[T]) -> usize {
        let mut reservation = self.reserve_largest(data.len());
        let n = reservation.len();
        reservation.as_mut_slice().copy_from_slice(&data[..n]);
        reservation.commit(n);
        n
    }

    /// Copies as much of the readable region as fits into `out` and
    /// consumes it. Mirrors the teacher crate's `Ring::recv`.
    pub fn try_read(&self, out: &mut [T]) -> usize {
        let view = self.peek();
        let n = out.len().min(view.len());
        out[..n].copy_from_slice(&view.as_slice()[..n]);
        view.consume(n);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_fill_and_drain() {
        let mut storage = [0u8; 17];
        let buf: Buffer<u8> = Buffer::new(&mut storage);

        let n = buf.try_write(b"Hello");
        assert_eq!(n, 5);
        assert_eq!(buf.committed(), 5);

        let mut out = [0u8; 5];
        let read = buf.try_read(&mut out);
        assert_eq!(read, 5);
        assert_eq!(&out, b"Hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn wrap_when_tail_has_made_room() {
        let mut storage = [0u8; 17];
        let buf: Buffer<u8> = Buffer::new(&mut storage);

        assert_eq!(buf.try_write(b"Hello, World!!"), 14);
        let mut sink = [0u8; 7];
        assert_eq!(buf.try_read(&mut sink), 7);
        assert_eq!(&sink, b"Hello, ");

        // Only 3 bytes free at the end (capacity 17, head at 14); ask for
        // more than that so the reservation wraps to the front, bounded by
        // `tail - 1`.
        let n = buf.try_write(b"!!!!");
        assert!(n > 0);
        assert!(buf.committed() > 0);
    }

    #[test]
    fn reserve_exact_fails_without_mutating_state() {
        let mut storage = [0u8; 4];
        let buf: Buffer<u8> = Buffer::new(&mut storage);
        let before = buf.committed();
        assert!(buf.reserve_exact(10).is_none());
        assert_eq!(buf.committed(), before);
        // The buffer is still fully usable afterwards.
        assert_eq!(buf.try_write(b"ab"), 2);
    }

    #[test]
    fn reserve_exact_with_backoff_gives_up_on_a_permanently_short_buffer() {
        let mut storage = [0u8; 4];
        let buf: Buffer<u8> = Buffer::new(&mut storage);
        assert!(buf.reserve_exact_with_backoff(10).is_none());
        assert_eq!(buf.try_write(b"ab"), 2);
    }

    #[test]
    fn reserve_exact_with_backoff_succeeds_once_space_exists() {
        let mut storage = [0u8; 8];
        let buf: Buffer<u8> = Buffer::new(&mut storage);
        let r = buf.reserve_exact_with_backoff(4).expect("space is available up front");
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn commit_zero_is_a_real_no_op() {
        let mut storage = [0u8; 8];
        let buf: Buffer<u8> = Buffer::new(&mut storage);
        let r = buf.reserve_largest(4);
        r.commit(0);
        assert_eq!(buf.committed(), 0);
        assert_eq!(buf.try_write(b"wxyz"), 4);
    }

    #[test]
    fn full_drain_refill_cycle() {
        let mut storage = [0u8; 5];
        let buf: Buffer<u8> = Buffer::new(&mut storage);
        for _ in 0..20 {
            let n = buf.try_write(b"abcd");
            let mut out = [0u8; 4];
            assert_eq!(buf.try_read(&mut out[..n]), n);
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut storage = [0u8; 8];
        let mut buf: Buffer<u8> = Buffer::new(&mut storage);
        buf.try_write(b"abcd");
        buf.reset();
        assert_eq!(buf.committed(), 0);
        assert_eq!(buf.try_write(b"efgh"), 4);
    }
}
