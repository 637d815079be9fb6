//! Error types for document operations.
//!
//! Most mutation entry points treat bad offsets and empty payloads as silent no-ops, so an
//! interactive caller can issue speculative edits from stale UI state. The `try_*` variants and
//! the history operations report the reason through [`DocumentError`].

use thiserror::Error;

/// Errors reported by the document engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Offset outside the range accepted by the operation.
    #[error("offset {offset} is out of range for a document of {len} characters")]
    OutOfRange {
        /// The rejected offset.
        offset: usize,
        /// Document length (excluding the EOF sentinel) at the time of the call.
        len: usize,
    },
    /// Zero-length insert or delete.
    #[error("edit has no effect: empty text or zero count")]
    EmptyOperation,
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
    /// Undo or redo was requested while a batch edit is still open.
    #[error("a batch edit is in progress")]
    BatchInProgress,
}

/// Result alias used throughout the crate.
pub type Result<T, E = DocumentError> = std::result::Result<T, E>;
