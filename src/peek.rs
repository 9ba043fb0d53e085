use crate::cursor::{AtomicCursor, Cursor};
use crate::invariants::debug_assert_consume_le_peeked;
use crate::Buffer;

/// A consumer-held snapshot of the readable region, created by
/// [`Buffer::peek`] and retired by at most one [`consume`](Self::consume)
/// call (spec.md §3).
///
/// Unlike a [`Reservation`](crate::Reservation), issuing a new `PeekView`
/// never invalidates an older one still in scope: both simply describe the
/// readable data as it stood at the moment `peek` ran, and `consume` only
/// ever compares its count against its own view's length. Nothing is
/// mutated until `consume` runs.
pub struct PeekView<'a, 'buf: 'a, T, C: Cursor = AtomicCursor> {
    slice: &'a [T],
    buffer: &'a Buffer<'buf, T, C>,
    tail_snapshot: usize,
    wrap: bool,
    mark_snapshot: usize,
}

impl<'a, 'buf: 'a, T, C: Cursor> PeekView<'a, 'buf, T, C> {
    pub(crate) fn new(
        slice: &'a [T],
        buffer: &'a Buffer<'buf, T, C>,
        tail_snapshot: usize,
        wrap: bool,
        mark_snapshot: usize,
    ) -> Self {
        Self {
            slice,
            buffer,
            tail_snapshot,
            wrap,
            mark_snapshot,
        }
    }

    /// The contiguous, readable view into the backing array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.slice
    }

    /// The number of elements currently readable.
    #[inline]
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// True if there was nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// Retires the first `count` elements of the view, advancing `tail` (and
    /// `mark`/wrapping it back to the start when the consumed region reaches
    /// the watermark; spec.md §4.2).
    ///
    /// `count` must be `<= self.len()`; `count == 0` is a legal no-op.
    pub fn consume(self, count: usize) {
        debug_assert_consume_le_peeked!(count, self.slice.len());
        let count = count.min(self.slice.len());
        self.buffer
            .consume_internal(self.tail_snapshot, self.wrap, self.mark_snapshot, count);
    }
}

#[cfg(test)]
mod tests {
    use crate::Buffer;

    #[test]
    fn empty_peek_on_fresh_buffer() {
        let mut storage = [0u8; 8];
        let buf = Buffer::new(&mut storage);
        let view = buf.peek();
        assert!(view.is_empty());
    }
}
