//! Cursor abstraction: the compile-time single-threaded/concurrent switch.
//!
//! `spec.md` §5/§9 asks for two things out of `head`/`tail`/`mark`:
//!
//! - when producer and consumer run on different threads, the precise
//!   relaxed/acquire/release discipline documented on [`Buffer`](crate::Buffer)
//!   must hold;
//! - when the caller statically knows both roles run on one thread, every
//!   atomic fence is dead weight and should compile away entirely.
//!
//! [`Cursor`] is the seam between those two worlds. `AtomicCursor` is an
//! `AtomicUsize` with exactly the orderings spec.md §5 names. `PlainCursor`
//! is a `Cell<usize>` with no ordering at all — same API, zero fences. Both
//! are `Copy`-free, `Send`/`Sync` as appropriate, and chosen as a type
//! parameter on `Buffer` rather than a cfg flag, so a program can use both
//! variants side by side (the teacher crate does the same with `Ring` and
//! `StackRing` rather than cfg-gating one out).

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single index cell (`head`, `tail`, or `mark`).
///
/// Implementors are responsible only for the load/store mechanics; the
/// orderings each call site uses are chosen by `Buffer` per spec.md §5, not
/// by the `Cursor` impl (an `AtomicCursor`'s `load_acquire` really does
/// acquire; a `PlainCursor`'s does a plain read, since there is nothing to
/// synchronize with on a single thread).
pub trait Cursor: Default {
    fn new(value: usize) -> Self;
    fn load_relaxed(&self) -> usize;
    fn load_acquire(&self) -> usize;
    fn store_relaxed(&self, value: usize);
    fn store_release(&self, value: usize);
}

/// Concurrent cursor: `AtomicUsize` with acquire/release semantics.
///
/// This is the default cursor for [`Buffer`](crate::Buffer). Use it whenever
/// the producer and consumer roles may be bound to different threads.
#[derive(Debug, Default)]
pub struct AtomicCursor(AtomicUsize);

impl Cursor for AtomicCursor {
    #[inline]
    fn new(value: usize) -> Self {
        Self(AtomicUsize::new(value))
    }

    #[inline]
    fn load_relaxed(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    fn load_acquire(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    fn store_relaxed(&self, value: usize) {
        self.0.store(value, Ordering::Relaxed);
    }

    #[inline]
    fn store_release(&self, value: usize) {
        self.0.store(value, Ordering::Release);
    }
}

/// Single-threaded cursor: a bare `Cell<usize>`, no atomics at all.
///
/// Correct only when the caller statically guarantees producer and consumer
/// operations are never interleaved across threads (spec.md §9: "expose the
/// single-threaded override as a compile-time specialization so the atomic
/// operations degrade to ordinary loads and stores").
#[derive(Debug, Default)]
pub struct PlainCursor(Cell<usize>);

// SAFETY: `PlainCursor` is only sound to share across threads if the caller
// upholds the single-threaded discipline documented above; `Buffer` does not
// assert this for callers, matching spec.md's external role-binding model.
unsafe impl Sync for PlainCursor {}

impl Cursor for PlainCursor {
    #[inline]
    fn new(value: usize) -> Self {
        Self(Cell::new(value))
    }

    #[inline]
    fn load_relaxed(&self) -> usize {
        self.0.get()
    }

    #[inline]
    fn load_acquire(&self) -> usize {
        self.0.get()
    }

    #[inline]
    fn store_relaxed(&self, value: usize) {
        self.0.set(value);
    }

    #[inline]
    fn store_release(&self, value: usize) {
        self.0.set(value);
    }
}
