//! Change notifications.
//!
//! Cursors never observe each other. Consumers that need to react to edits (re-tokenizers,
//! renderers, other views) subscribe on the [`Document`](crate::Document) and receive a
//! [`DocumentChange`] after each observable mutation.

/// What kind of mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Text was inserted by a regular edit.
    Inserted,
    /// Text was deleted by a regular edit.
    Deleted,
    /// A transaction was undone.
    Undo,
    /// A transaction was redone.
    Redo,
    /// Word wrap was toggled or the metrics changed; rows were recomputed.
    Layout,
    /// Highlight spans were replaced or cleared.
    Spans,
}

/// A change record delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Change type.
    pub kind: ChangeKind,
    /// Lowest offset touched (0 for layout and span changes).
    pub offset: usize,
    /// Characters inserted by this change.
    pub inserted: usize,
    /// Characters removed by this change.
    pub removed: usize,
    /// Document version after the change.
    pub version: u64,
}

impl DocumentChange {
    pub(crate) fn new(kind: ChangeKind, version: u64) -> Self {
        Self {
            kind,
            offset: 0,
            inserted: 0,
            removed: 0,
            version,
        }
    }

    pub(crate) fn with_edit(mut self, offset: usize, inserted: usize, removed: usize) -> Self {
        self.offset = offset;
        self.inserted = inserted;
        self.removed = removed;
        self
    }
}

/// Handle returned by [`Document::subscribe`](crate::Document::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Change callback.
pub type ChangeCallback = Box<dyn FnMut(&DocumentChange)>;
