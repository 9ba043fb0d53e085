use thiserror::Error;

/// Identifies a broken producer/consumer contract.
///
/// `spec.md` §7 classifies these as programmer errors: fatal, never
/// recoverable, elided entirely outside safety-checked builds. This type
/// exists only to give each violation a documented, `Display`-able identity
/// for the `panic!` message the safety-check macros raise — mirroring the
/// teacher crate's `ChannelError`, which names its own failure modes with
/// `thiserror`, even though here the enum feeds a panic rather than a
/// returned `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The backing array supplied to `Buffer::new` was empty.
    #[error("bip-buffer constructed over an empty backing array")]
    EmptyStorage,
    /// `commit` was called with a count greater than the reservation length.
    #[error("commit({requested}) exceeds reserved length {reserved}")]
    CommitExceedsReservation { requested: usize, reserved: usize },
    /// `consume` was called with a count greater than the peek view length.
    #[error("consume({requested}) exceeds peeked length {peeked}")]
    ConsumeExceedsPeek { requested: usize, peeked: usize },
    /// A second reservation was requested while one was already outstanding.
    #[error("a reservation is already outstanding on this buffer")]
    ReservationAlreadyOutstanding,
    /// `reset` was called while a reservation or peek was outstanding.
    #[error("reset called while a reservation or peek was outstanding")]
    ResetWhileOutstanding,
}
