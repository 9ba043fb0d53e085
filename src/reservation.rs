use crate::cursor::{AtomicCursor, Cursor};
use crate::invariants::debug_assert_commit_le_reserved;
use crate::Buffer;

/// A producer-held token granting exclusive write access to a contiguous
/// span of the backing array, created by [`Buffer::reserve_largest`] /
/// [`Buffer::reserve_exact`] and retired by exactly one [`commit`](Self::commit)
/// call (spec.md §3).
///
/// Dropping a `Reservation` without committing is a legal abort: no index
/// changes anything until `commit` runs (spec.md §5, "Cancellation").
pub struct Reservation<'a, 'buf: 'a, T, C: Cursor = AtomicCursor> {
    slice: &'a mut [T],
    buffer: &'a Buffer<'buf, T, C>,
    head_snapshot: usize,
    mark_base: usize,
    mark_shift: bool,
}

impl<'a, 'buf: 'a, T, C: Cursor> Reservation<'a, 'buf, T, C> {
    pub(crate) fn new(
        slice: &'a mut [T],
        buffer: &'a Buffer<'buf, T, C>,
        head_snapshot: usize,
        mark_base: usize,
        mark_shift: bool,
    ) -> Self {
        Self {
            slice,
            buffer,
            head_snapshot,
            mark_base,
            mark_shift,
        }
    }

    /// The contiguous, writable view into the backing array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.slice
    }

    /// The number of elements reserved (may be less than requested).
    #[inline]
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// True if nothing was reserved.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Publishes the first `count` elements of the reservation as readable
    /// and releases the reservation (spec.md §4.1).
    ///
    /// `count` must be `<= self.len()`; `count == 0` is a legal no-op beyond
    /// token retirement. Committing more than reserved is a programmer error
    /// (spec.md §7) and panics in safety-checked builds.
    pub fn commit(self, count: usize) {
        debug_assert_commit_le_reserved!(count, self.slice.len());
        let count = count.min(self.slice.len());
        self.buffer
            .commit_internal(self.head_snapshot, self.mark_base, self.mark_shift, count);
    }
}

impl<'a, 'buf: 'a, T, C: Cursor> Drop for Reservation<'a, 'buf, T, C> {
    fn drop(&mut self) {
        self.buffer.clear_reservation_outstanding();
    }
}

#[cfg(test)]
mod tests {
    use crate::Buffer;

    #[test]
    fn abandoned_reservation_is_a_legal_abort() {
        let mut storage = [0u8; 8];
        let buf = Buffer::new(&mut storage);
        {
            let mut r = buf.reserve_largest(4);
            r.as_mut_slice()[0] = 1;
            // dropped without commit
        }
        assert_eq!(buf.committed(), 0);
        // A fresh reservation is grantable again afterwards.
        let r2 = buf.reserve_largest(4);
        assert_eq!(r2.len(), 4);
    }
}
