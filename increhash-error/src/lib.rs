//! Centralized error type for the `increhash` dictionary engine.
//!
//! Mirrors the taxonomy of the dictionary's error handling design:
//! precondition violations and allocation failures are recoverable and flow
//! through [`DictResult`]; misuse (fingerprint mismatch, pause-rehash
//! underflow) indicates a caller bug and is raised as a panic at the call
//! site, but still gets a named variant here so a `catch_unwind` boundary has
//! something to report.

use thiserror::Error;

/// Errors surfaced by `Dict`'s public operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DictError {
    /// `expand`/`try_expand` was called while a rehash was already in progress.
    #[error("cannot expand while a rehash is in progress")]
    ExpandWhileRehashing,

    /// The requested size is smaller than the number of entries already stored.
    #[error("requested size {requested} is smaller than current used count {used}")]
    ExpandTooSmall { requested: usize, used: usize },

    /// The computed target size equals the table's current size; nothing to do.
    #[error("expand target size is unchanged")]
    ExpandNoOp,

    /// `add` was called with a key that already exists.
    #[error("key already exists")]
    KeyExists,

    /// `resize` was called while a rehash was already in progress.
    #[error("cannot resize while a rehash is in progress")]
    ResizeWhileRehashing,

    /// `resize` was called while global resizing has been disabled.
    #[error("resize is disabled")]
    ResizeDisabled,

    /// `try_expand` could not allocate the requested backing storage.
    #[error("allocation failed for requested size {requested}")]
    AllocationFailed { requested: usize },

    /// An unsafe iterator's shape fingerprint changed between creation and release.
    #[error("dictionary was mutated during unsafe iteration (fingerprint mismatch)")]
    FingerprintMismatch,

    /// `pause_rehash` would have gone negative on `resume_rehashing`.
    #[error("pause_rehash underflow: resume_rehashing called without a matching pause")]
    PauseRehashingUnderflow,
}

/// Convenience alias for the dictionary's fallible operations.
pub type DictResult<T> = Result<T, DictError>;
