//! Debug assertion macros for bip-buffer invariants.
//!
//! These mirror the teacher crate's `invariants.rs`: one macro per named
//! invariant from `spec.md` §3/§8, active under `cfg(debug_assertions)` (zero
//! overhead in release builds) or, for callers who would rather pay for the
//! check than risk silent corruption, under the `force-safety-checks`
//! feature (spec.md §6's "compile-time/configuration switch for the
//! safety-check level"; spec.md §7: abort with a message identifying the
//! violation in safety-checked builds, elide in release).

// =============================================================================
// INV-IDX-01: Index bounds
// =============================================================================

/// Assert that `head` and `tail` lie in `[0, capacity)` and `mark` in
/// `[0, capacity]`.
///
/// Used in: every commit/consume, after computing the new index.
macro_rules! debug_assert_index_bounds {
    ($name:literal, $value:expr, $capacity:expr) => {
        crate::invariants::maybe_assert!(
            $value <= $capacity,
            "INV-IDX-01 violated: {} = {} exceeds capacity {}",
            $name,
            $value,
            $capacity
        )
    };
}

// =============================================================================
// INV-IDX-02: Wrapped-configuration ordering
// =============================================================================

/// Assert `head <= mark` and `tail <= mark` whenever the buffer is in the
/// wrapped configuration (`head < tail`).
///
/// Used in: `commit` after a wrap, and in `peek` before reading `mark`.
macro_rules! debug_assert_wrapped_order {
    ($head:expr, $tail:expr, $mark:expr) => {
        crate::invariants::maybe_assert!(
            $head >= $tail || ($head <= $mark && $tail <= $mark),
            "INV-IDX-02 violated: wrapped config requires head <= mark and tail <= mark, got head={} tail={} mark={}",
            $head,
            $tail,
            $mark
        )
    };
}

// =============================================================================
// INV-RES-01: Single outstanding reservation
// =============================================================================

/// Assert that no reservation is currently outstanding before granting a new
/// one.
///
/// Used in: `reserve_largest`/`reserve_exact`.
macro_rules! debug_assert_no_reservation_outstanding {
    ($flag:expr) => {
        crate::invariants::maybe_assert!(
            !$flag,
            "INV-RES-01 violated: {}",
            crate::error::ContractViolation::ReservationAlreadyOutstanding
        )
    };
}

// =============================================================================
// INV-RES-02: Commit does not exceed reservation
// =============================================================================

/// Assert that a commit count never exceeds the reservation's length.
///
/// Used in: `Reservation::commit`.
macro_rules! debug_assert_commit_le_reserved {
    ($count:expr, $len:expr) => {
        crate::invariants::maybe_assert!(
            $count <= $len,
            "INV-RES-02 violated: {}",
            crate::error::ContractViolation::CommitExceedsReservation {
                requested: $count,
                reserved: $len,
            }
        )
    };
}

// =============================================================================
// INV-PEEK-01: Single outstanding peek
// =============================================================================

/// Assert that no peek is currently outstanding before granting a new one.
///
/// `spec.md` actually permits a fresh peek at any time (each returns a
/// snapshot), so this is only checked against the *consume* discipline: a
/// consume count can never exceed the peek view it was issued against.
///
/// Used in: `PeekView::consume`.
macro_rules! debug_assert_consume_le_peeked {
    ($count:expr, $len:expr) => {
        crate::invariants::maybe_assert!(
            $count <= $len,
            "INV-PEEK-01 violated: {}",
            crate::error::ContractViolation::ConsumeExceedsPeek {
                requested: $count,
                peeked: $len,
            }
        )
    };
}

// =============================================================================
// INV-CTOR-01: Non-empty backing storage
// =============================================================================

/// Assert that the backing array supplied at construction is non-empty.
///
/// Used in: `Buffer::new`.
macro_rules! debug_assert_nonempty_storage {
    ($len:expr) => {
        crate::invariants::maybe_assert!(
            $len > 0,
            "INV-CTOR-01 violated: {}",
            crate::error::ContractViolation::EmptyStorage
        )
    };
}

/// Expands to `debug_assert!` unless the `force-safety-checks` feature is
/// enabled, in which case it expands to a real `assert!` that runs in
/// release builds too.
macro_rules! maybe_assert {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "force-safety-checks")) {
            assert!($($arg)*);
        }
    };
}

pub(crate) use debug_assert_commit_le_reserved;
pub(crate) use debug_assert_consume_le_peeked;
pub(crate) use debug_assert_index_bounds;
pub(crate) use debug_assert_no_reservation_outstanding;
pub(crate) use debug_assert_nonempty_storage;
pub(crate) use debug_assert_wrapped_order;
pub(crate) use maybe_assert;
