//! Error types for timeline and availability operations.

use thiserror::Error;

/// Errors returned by [`Timeline`](crate::Timeline) and
/// [`Availability`](crate::Availability) operations.
///
/// All of these are returned to the caller, never logged internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineError {
    /// A slot whose end does not come strictly after its start.
    #[error("invalid slot: end does not come after start")]
    InvalidSlot,

    /// A query window with `from` after `to`.
    #[error("invalid range: from is after to")]
    InvalidRange,

    /// An identical slot is already stored.
    #[error("slot already exists")]
    AlreadyExists,

    /// Overlapping slots carry different occurrence tags.
    #[error("overlapping slots have mismatching occurrences")]
    OccurrenceMismatch,

    /// `add` was called with an empty batch.
    #[error("no slots to add")]
    NoSlots,
}

pub type Result<T> = std::result::Result<T, TimelineError>;
