//! Loom-based concurrency tests for bipbuf-rs.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! These model the `head`/`tail`/`mark` protocol in isolation, at a small
//! capacity, so loom's exhaustive interleaving search stays tractable. The
//! full `Buffer` can't run under loom directly (loom's atomics are a
//! different type from `std`'s, and `Cursor` is generic over the
//! concrete atomic type rather than over a trait loom also implements),
//! so this is a deliberately reduced model of the same ordering contract
//! spec.md §5 documents for `Buffer`: the producer's `head` store is
//! `Release`, matched by the consumer's `Acquire` load, and symmetrically
//! for `tail`; `mark` rides along on `head`'s release, `Relaxed` on both
//! sides.

#![cfg(feature = "loom")]

use loom::cell::UnsafeCell;
use loom::sync::atomic::{AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;

const CAP: usize = 4;

/// A capacity-4 bip-buffer of `u8`, reduced for loom's state-space search.
struct LoomBip {
    head: AtomicUsize,
    tail: AtomicUsize,
    mark: AtomicUsize,
    storage: UnsafeCell<[u8; CAP]>,
}

unsafe impl Send for LoomBip {}
unsafe impl Sync for LoomBip {}

impl LoomBip {
    fn new() -> Self {
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            mark: AtomicUsize::new(CAP),
            storage: UnsafeCell::new([0; CAP]),
        }
    }

    /// Writes up to `data.len()` bytes in one reservation+commit. Returns
    /// the number actually written.
    fn write(&self, data: &[u8]) -> usize {
        let h = self.head.load(Ordering::Relaxed);
        let t = self.tail.load(Ordering::Acquire);

        let (start, len, mark_base, wrap) = if h >= t {
            let end_gap = if t > 0 { CAP - h } else { CAP - 1 - h };
            if end_gap >= data.len() {
                (h, data.len().min(end_gap), 0, false)
            } else {
                let avail = if t > 0 { t - 1 } else { 0 };
                (0, data.len().min(avail), h, true)
            }
        } else {
            let avail = t - h - 1;
            (h, data.len().min(avail), 0, false)
        };

        if len == 0 {
            return 0;
        }

        self.storage.get_mut().with(|ptr| {
            let slice = unsafe { &mut (*ptr)[start..start + len] };
            slice.copy_from_slice(&data[..len]);
        });

        if wrap {
            self.mark.store(mark_base, Ordering::Relaxed);
        }
        self.head.store(start + len, Ordering::Release);
        len
    }

    /// Reads up to `out.len()` bytes in one peek+consume. Returns the
    /// number actually read.
    fn read(&self, out: &mut [u8]) -> usize {
        let mut t = self.tail.load(Ordering::Relaxed);
        let h = self.head.load(Ordering::Acquire);

        let (len, collapse) = if h >= t {
            (h - t, false)
        } else {
            let m = self.mark.load(Ordering::Relaxed);
            if t >= m {
                (h, true)
            } else {
                (m - t, false)
            }
        };

        if collapse {
            t = 0;
            self.tail.store(0, Ordering::Release);
        }

        let n = out.len().min(len);
        if n == 0 {
            return 0;
        }

        self.storage.get_mut().with(|ptr| {
            let slice = unsafe { &(*ptr)[t..t + n] };
            out[..n].copy_from_slice(slice);
        });

        self.tail.store(t + n, Ordering::Release);
        n
    }
}

#[test]
fn loom_spsc_preserves_order_and_count() {
    loom::model(|| {
        let bip = Arc::new(LoomBip::new());
        let producer_bip = Arc::clone(&bip);

        let producer = thread::spawn(move || {
            producer_bip.write(&[1]);
            producer_bip.write(&[2]);
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            for _ in 0..20 {
                let mut out = [0u8; 1];
                if bip.read(&mut out) == 1 {
                    received.push(out[0]);
                }
                if received.len() == 2 {
                    break;
                }
                loom::thread::yield_now();
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        // Whatever was received came out in the order it was sent.
        let mut expected_prefix = vec![1, 2];
        expected_prefix.truncate(received.len());
        assert_eq!(received, expected_prefix);
    });
}

#[test]
fn loom_no_torn_reads_across_a_wrap() {
    loom::model(|| {
        let bip = Arc::new(LoomBip::new());
        let producer_bip = Arc::clone(&bip);

        let producer = thread::spawn(move || {
            producer_bip.write(&[9, 9, 9]);
        });

        let consumer = thread::spawn(move || {
            let mut out = [0u8; 3];
            let mut total = 0;
            for _ in 0..20 {
                total += bip.read(&mut out[total..]);
                if total == 3 {
                    break;
                }
                loom::thread::yield_now();
            }
            out
        });

        producer.join().unwrap();
        let out = consumer.join().unwrap();
        for &b in &out {
            assert!(b == 0 || b == 9, "torn or garbage read: {b}");
        }
    });
}
