//! bipbuf-rs - a lock-free single-producer single-consumer bipartite
//! circular buffer
//!
//! A bip-buffer is a fixed-capacity ring buffer that always hands back a
//! single contiguous span on every reservation and every peek, even across
//! a wraparound. It does this with three indices instead of the usual two:
//! `head` (write position), `tail` (read position), and `mark` (a
//! watermark recording where the previous lap's data ends once the
//! producer wraps back to the front).
//!
//! # Key properties
//!
//! - Zero-copy: reservations and peeks are direct `&mut [T]` / `&[T]`
//!   slices into caller-supplied storage, never a private owned buffer.
//! - Always contiguous: no caller-side logic for "read may wrap, check
//!   twice" — a reservation or peek is one slice or it's empty.
//! - Wait-free: `reserve_largest`/`reserve_exact` and `peek` never block;
//!   a full or empty buffer just yields a short or zero-length result.
//!
//! # Example
//!
//! ```
//! use bipbuf_rs::Buffer;
//!
//! let mut storage = [0u8; 64];
//! let buf = Buffer::new(&mut storage);
//!
//! let n = buf.try_write(b"hello");
//! assert_eq!(n, 5);
//!
//! let mut out = [0u8; 5];
//! let read = buf.try_read(&mut out);
//! assert_eq!(read, 5);
//! assert_eq!(&out, b"hello");
//! ```
//!
//! Or, for full control over partial grants, using the reservation and
//! peek tokens directly:
//!
//! ```
//! use bipbuf_rs::Buffer;
//!
//! let mut storage = [0u8; 8];
//! let buf = Buffer::new(&mut storage);
//!
//! let mut reservation = buf.reserve_largest(4);
//! let granted = reservation.len();
//! reservation.as_mut_slice()[..granted].fill(b'x');
//! reservation.commit(granted);
//!
//! let view = buf.peek();
//! assert_eq!(view.len(), granted);
//! view.consume(granted);
//! ```
//!
//! # Feature flags
//!
//! - `force-safety-checks`: promotes the internal contract-violation
//!   assertions (single outstanding reservation, commit/consume bounds,
//!   index invariants) from `debug_assert!` to `assert!`, so they run in
//!   release builds too.
//! - `loom`: builds the crate against [`loom`] for exhaustive
//!   producer/consumer interleaving checks in `tests/loom_tests.rs`,
//!   instead of the real `std::sync::atomic` types.

mod backoff;
mod buffer;
mod config;
mod cursor;
mod error;
mod invariants;
mod metrics;
mod peek;
mod reservation;

pub use backoff::Backoff;
pub use buffer::Buffer;
pub use config::Config;
pub use cursor::{AtomicCursor, Cursor, PlainCursor};
pub use error::ContractViolation;
pub use metrics::{Metrics, MetricsSnapshot};
pub use peek::PeekView;
pub use reservation::Reservation;
