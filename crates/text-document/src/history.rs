//! Undo/Redo History
//!
//! Every primitive edit is recorded as an [`EditOperation`]. Operations are grouped into
//! [`Transaction`]s, the unit of undo and redo:
//!
//! - **Explicit batches**: everything between the outermost `begin_batch` and its matching
//!   `end_batch` forms one transaction. Nested batches share the outer transaction.
//! - **Implicit transactions**: an edit outside a batch commits immediately as a single-operation
//!   transaction, unless it continues the previous one (same kind, contiguous, within the
//!   coalescing window), in which case it is appended to it.
//!
//! Committing a new transaction discards the redo stack. The history only stores and hands out
//! transactions; applying them to the text is the document's job, so undo/redo replays are never
//! recorded again.

use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Kind of a primitive edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Characters were inserted.
    Insert,
    /// Characters were deleted.
    Delete,
}

/// One primitive, reversible edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    /// Insert or delete.
    pub kind: EditKind,
    /// Offset of the edit in the document it was applied to.
    pub offset: usize,
    /// Inserted text, or the exact text that was deleted.
    pub text: String,
    /// When the edit happened.
    pub timestamp: Instant,
}

impl EditOperation {
    /// Record of an insertion.
    pub fn insert(offset: usize, text: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            kind: EditKind::Insert,
            offset,
            text: text.into(),
            timestamp,
        }
    }

    /// Record of a deletion.
    pub fn delete(offset: usize, text: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            kind: EditKind::Delete,
            offset,
            text: text.into(),
            timestamp,
        }
    }

    /// Length of `text` in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if the operation carries no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The operation that reverses this one.
    pub fn inverse(&self) -> Self {
        let kind = match self.kind {
            EditKind::Insert => EditKind::Delete,
            EditKind::Delete => EditKind::Insert,
        };
        Self {
            kind,
            offset: self.offset,
            text: self.text.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Whether `next` continues this operation closely enough to share a transaction.
    fn continues_with(&self, next: &EditOperation, window: Duration) -> bool {
        if self.kind != next.kind {
            return false;
        }
        if next.timestamp.saturating_duration_since(self.timestamp) > window {
            return false;
        }

        match self.kind {
            EditKind::Insert => {
                !next.text.contains('\n') && next.offset == self.offset + self.len()
            }
            // Backspace walks left, forward delete stays put.
            EditKind::Delete => {
                next.offset + next.len() == self.offset || next.offset == self.offset
            }
        }
    }
}

/// A non-empty group of operations undone and redone as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    operations: Vec<EditOperation>,
}

impl Transaction {
    fn new(first: EditOperation) -> Self {
        Self {
            operations: vec![first],
        }
    }

    /// Operations in the order they were applied.
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Always `false`: transactions hold at least one operation.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Caret offset after undoing this transaction.
    ///
    /// The inverse of the first operation is applied last: an undone insert leaves the caret at
    /// its start, an undone delete leaves it after the restored text.
    pub fn undo_caret(&self) -> usize {
        self.operations.first().map_or(0, |op| match op.kind {
            EditKind::Insert => op.offset,
            EditKind::Delete => op.offset + op.len(),
        })
    }

    /// Caret offset after redoing this transaction.
    pub fn redo_caret(&self) -> usize {
        self.operations.last().map_or(0, |op| match op.kind {
            EditKind::Insert => op.offset + op.len(),
            EditKind::Delete => op.offset,
        })
    }

    fn last(&self) -> Option<&EditOperation> {
        self.operations.last()
    }

    fn push(&mut self, op: EditOperation) {
        self.operations.push(op);
    }
}

/// Undo and redo stacks plus the transaction currently being built.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    max_transactions: usize,
    coalesce_window: Option<Duration>,
    /// Nesting depth of explicit batches.
    batch_depth: usize,
    /// Transaction accumulating inside an explicit batch.
    open_batch: Option<Transaction>,
    /// Whether the top of the undo stack may absorb the next compatible edit.
    merge_open: bool,
    /// Clean point, as an `undo_stack` length. `None` once the clean state is unreachable.
    clean_index: Option<usize>,
}

impl UndoHistory {
    /// Create a history bounded to `max_transactions` entries.
    pub fn new(max_transactions: usize, coalesce_window: Option<Duration>) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_transactions: max_transactions.max(1),
            coalesce_window,
            batch_depth: 0,
            open_batch: None,
            merge_open: false,
            clean_index: Some(0),
        }
    }

    /// Record an applied edit.
    pub fn record(&mut self, op: EditOperation) {
        if self.batch_depth > 0 {
            match self.open_batch.as_mut() {
                Some(batch) => batch.push(op),
                None => self.open_batch = Some(Transaction::new(op)),
            }
            return;
        }

        if self.can_merge(&op)
            && let Some(top) = self.undo_stack.last_mut()
        {
            trace!(offset = op.offset, ops = top.len() + 1, "coalesced edit");
            top.push(op);
            return;
        }

        self.commit(Transaction::new(op));
        self.merge_open = self.coalesce_window.is_some();
    }

    /// Open an explicit batch. Nested calls join the outer batch.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
        if self.batch_depth == 1 {
            self.merge_open = false;
            self.open_batch = None;
        }
    }

    /// Close one level of batching; the outermost call commits the batch.
    ///
    /// Returns `false` if no batch was open. A batch that recorded nothing commits nothing.
    pub fn end_batch(&mut self) -> bool {
        if self.batch_depth == 0 {
            warn!("end_batch called without a matching begin_batch");
            return false;
        }

        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if let Some(batch) = self.open_batch.take() {
                self.commit(batch);
            }
            self.merge_open = false;
        }
        true
    }

    /// Returns `true` while an explicit batch is open.
    pub fn is_batch_edit(&self) -> bool {
        self.batch_depth > 0
    }

    /// Stop coalescing into the current implicit transaction (caret moved, selection changed).
    pub fn end_group(&mut self) {
        self.merge_open = false;
    }

    /// Returns `true` if a transaction can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if a transaction can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of transactions on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of transactions on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Pop the transaction to undo. Pass it to [`finish_undo`](Self::finish_undo) once applied.
    pub fn take_undo(&mut self) -> Option<Transaction> {
        self.merge_open = false;
        self.undo_stack.pop()
    }

    /// Move an undone transaction onto the redo stack.
    pub fn finish_undo(&mut self, transaction: Transaction) {
        self.redo_stack.push(transaction);
    }

    /// Pop the transaction to redo. Pass it to [`finish_redo`](Self::finish_redo) once applied.
    pub fn take_redo(&mut self) -> Option<Transaction> {
        self.merge_open = false;
        self.redo_stack.pop()
    }

    /// Move a redone transaction back onto the undo stack.
    pub fn finish_redo(&mut self, transaction: Transaction) {
        self.undo_stack.push(transaction);
    }

    /// Returns `true` if the current state is the clean point.
    pub fn is_clean(&self) -> bool {
        self.batch_depth == 0 && self.clean_index == Some(self.undo_stack.len())
    }

    /// Mark the current state as clean (e.g. after saving).
    pub fn mark_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
        self.end_group();
    }

    fn can_merge(&self, op: &EditOperation) -> bool {
        let Some(window) = self.coalesce_window else {
            return false;
        };
        if !self.merge_open || self.clean_index == Some(self.undo_stack.len()) {
            return false;
        }

        self.undo_stack
            .last()
            .and_then(Transaction::last)
            .is_some_and(|last| last.continues_with(op, window))
    }

    fn commit(&mut self, transaction: Transaction) {
        self.clear_redo_and_adjust_clean();

        trace!(ops = transaction.len(), "committed transaction");
        self.undo_stack.push(transaction);

        if self.undo_stack.len() > self.max_transactions {
            self.undo_stack.remove(0);
            self.clean_index = match self.clean_index {
                Some(0) | None => None,
                Some(index) => Some(index - 1),
            };
            debug!(
                max = self.max_transactions,
                "evicted oldest transaction from undo history"
            );
        }
    }

    fn clear_redo_and_adjust_clean(&mut self) {
        if self.redo_stack.is_empty() {
            return;
        }

        // A clean point inside the redo area becomes unreachable.
        if let Some(clean_index) = self.clean_index
            && clean_index > self.undo_stack.len()
        {
            self.clean_index = None;
        }

        self.redo_stack.clear();
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(1000, Some(Duration::from_secs(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing(history: &mut UndoHistory, start: Instant, text: &str, offset: usize) {
        for (i, ch) in text.chars().enumerate() {
            history.record(EditOperation::insert(
                offset + i,
                ch.to_string(),
                start + Duration::from_millis(10 * i as u64),
            ));
        }
    }

    #[test]
    fn test_implicit_edits_commit_individually_without_coalescing() {
        let mut history = UndoHistory::new(100, None);
        typing(&mut history, Instant::now(), "abc", 0);
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn test_contiguous_typing_coalesces() {
        let mut history = UndoHistory::default();
        typing(&mut history, Instant::now(), "abc", 0);
        assert_eq!(history.undo_depth(), 1);

        let transaction = history.take_undo().expect("transaction");
        assert_eq!(transaction.len(), 3);
        assert_eq!(transaction.undo_caret(), 0);
        assert_eq!(transaction.redo_caret(), 3);
    }

    #[test]
    fn test_time_gap_breaks_coalescing() {
        let mut history = UndoHistory::default();
        let start = Instant::now();
        history.record(EditOperation::insert(0, "a", start));
        history.record(EditOperation::insert(
            1,
            "b",
            start + Duration::from_secs(5),
        ));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_non_contiguous_or_mixed_edits_do_not_coalesce() {
        let mut history = UndoHistory::default();
        let now = Instant::now();
        history.record(EditOperation::insert(0, "a", now));
        history.record(EditOperation::insert(5, "b", now));
        history.record(EditOperation::delete(5, "b", now));
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn test_backspace_and_forward_delete_coalesce() {
        let mut history = UndoHistory::default();
        let now = Instant::now();
        history.record(EditOperation::delete(4, "d", now));
        history.record(EditOperation::delete(3, "c", now));
        history.record(EditOperation::delete(3, "e", now));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_newline_insert_starts_new_transaction() {
        let mut history = UndoHistory::default();
        let now = Instant::now();
        history.record(EditOperation::insert(0, "a", now));
        history.record(EditOperation::insert(1, "\n", now));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_end_group_breaks_coalescing() {
        let mut history = UndoHistory::default();
        let now = Instant::now();
        history.record(EditOperation::insert(0, "a", now));
        history.end_group();
        history.record(EditOperation::insert(1, "b", now));
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_nested_batches_share_one_transaction() {
        let mut history = UndoHistory::default();
        let now = Instant::now();

        history.begin_batch();
        history.record(EditOperation::insert(0, "x", now));
        history.begin_batch();
        history.record(EditOperation::insert(1, "y", now));
        assert!(history.end_batch());
        assert_eq!(history.undo_depth(), 0);
        assert!(history.is_batch_edit());
        assert!(history.end_batch());

        assert!(!history.is_batch_edit());
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.take_undo().map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_unmatched_end_batch_is_rejected() {
        let mut history = UndoHistory::default();
        assert!(!history.end_batch());
    }

    #[test]
    fn test_empty_batch_commits_nothing() {
        let mut history = UndoHistory::default();
        history.begin_batch();
        history.end_batch();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_commit_truncates_redo_stack() {
        let mut history = UndoHistory::new(100, None);
        let now = Instant::now();
        history.record(EditOperation::insert(0, "a", now));
        let undone = history.take_undo().expect("transaction");
        history.finish_undo(undone);
        assert!(history.can_redo());

        history.record(EditOperation::insert(0, "b", now));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut history = UndoHistory::new(2, None);
        let now = Instant::now();
        for i in 0..3 {
            history.record(EditOperation::insert(i, "z", now));
        }
        assert_eq!(history.undo_depth(), 2);
        let oldest_kept = history.undo_stack.first().map(|t| t.operations()[0].offset);
        assert_eq!(oldest_kept, Some(1));
        // Clean point (empty document) was evicted.
        assert!(!history.is_clean());
    }

    #[test]
    fn test_clean_point_tracking() {
        let mut history = UndoHistory::new(100, None);
        let now = Instant::now();
        assert!(history.is_clean());

        history.record(EditOperation::insert(0, "a", now));
        assert!(!history.is_clean());
        history.mark_clean();
        assert!(history.is_clean());

        let undone = history.take_undo().expect("transaction");
        history.finish_undo(undone);
        assert!(!history.is_clean());

        // Branching away from the clean point makes it unreachable.
        history.record(EditOperation::insert(0, "b", now));
        assert!(!history.is_clean());
        assert_eq!(history.clean_index, None);
    }

    #[test]
    fn test_inverse_and_carets() {
        let now = Instant::now();
        let delete = EditOperation::delete(2, "xyz", now);
        let inverse = delete.inverse();
        assert_eq!(inverse.kind, EditKind::Insert);
        assert_eq!(inverse.text, "xyz");

        let transaction = Transaction::new(delete);
        assert_eq!(transaction.undo_caret(), 5);
        assert_eq!(transaction.redo_caret(), 2);
    }
}
