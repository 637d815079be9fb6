//! Document aggregate.
//!
//! [`Document`] owns the character store, the line and row indexes, the span registry and the
//! undo history, and is the only place text is mutated. Every store edit is followed by the
//! matching index patch inside the same call, so no reader ever sees them out of sync.
//!
//! # Example
//!
//! ```rust
//! use text_document::{CellMetrics, Document};
//!
//! let mut doc = Document::new(CellMetrics::new(3));
//! doc.insert(0, "abcdef");
//! assert_eq!(doc.row_count(), 1);
//!
//! doc.set_word_wrap(true);
//! assert_eq!(doc.row_count(), 2);
//! assert_eq!(doc.row_text(1), "def");
//!
//! doc.undo().unwrap();
//! assert!(doc.is_empty());
//! ```

use crate::change::{ChangeCallback, ChangeKind, DocumentChange, SubscriptionId};
use crate::config::DocumentConfig;
use crate::error::{DocumentError, Result};
use crate::history::{EditKind, EditOperation, Transaction, UndoHistory};
use crate::layout::{RowIndex, TextMetrics, column_at_x, str_width};
use crate::line_index::LineIndex;
use crate::spans::{Span, SpanRegistry};
use crate::storage::GapBuffer;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, trace};

/// A document shared between several cursors on one thread.
pub type SharedDocument = Rc<RefCell<Document>>;

/// The mutable backing store of one text editor buffer.
pub struct Document {
    store: GapBuffer,
    lines: LineIndex,
    rows: RowIndex,
    spans: SpanRegistry,
    history: UndoHistory,
    metrics: Box<dyn TextMetrics>,
    word_wrap: bool,
    config: DocumentConfig,
    version: u64,
    subscribers: Vec<(SubscriptionId, ChangeCallback)>,
    next_subscription: u64,
}

impl Document {
    /// Create an empty document.
    pub fn new(metrics: impl TextMetrics + 'static) -> Self {
        Self::with_config("", metrics, DocumentConfig::default())
    }

    /// Create a document holding `text`. The initial text is not undoable.
    pub fn with_text(text: &str, metrics: impl TextMetrics + 'static) -> Self {
        Self::with_config(text, metrics, DocumentConfig::default())
    }

    /// Create a document with explicit configuration.
    pub fn with_config(
        text: &str,
        metrics: impl TextMetrics + 'static,
        config: DocumentConfig,
    ) -> Self {
        let lines = LineIndex::from_text(text);
        let rows = RowIndex::unwrapped(lines.line_count());

        Self {
            store: GapBuffer::with_gap_size(text, config.initial_capacity),
            lines,
            rows,
            spans: SpanRegistry::new(),
            history: UndoHistory::new(config.max_transactions, config.coalesce_window),
            metrics: Box::new(metrics),
            word_wrap: false,
            config,
            version: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Wrap the document for sharing between cursors.
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// Active configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    // ----- Character access -------------------------------------------------------------------

    /// Number of characters, excluding the EOF sentinel.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the document holds no characters.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns `true` if `offset` lies in `[0, len]`.
    pub fn is_valid(&self, offset: usize) -> bool {
        self.store.is_valid(offset)
    }

    /// Character at `offset`; [`EOF_CHAR`](crate::EOF_CHAR) at `len`, an error beyond.
    pub fn get(&self, offset: usize) -> Result<char> {
        self.store.get(offset)
    }

    /// Character at `offset`; [`NULL_CHAR`](crate::NULL_CHAR) past the EOF sentinel.
    pub fn char_at(&self, offset: usize) -> char {
        self.store.char_at(offset)
    }

    /// Up to `max_chars` characters starting at `offset`.
    pub fn sub_sequence(&self, offset: usize, max_chars: usize) -> String {
        self.store.slice(offset, max_chars)
    }

    /// Complete text.
    pub fn text(&self) -> String {
        self.store.text()
    }

    // ----- Editing ------------------------------------------------------------------------------

    /// Insert `text` before `offset`, timestamped now. See [`insert_at`](Self::insert_at).
    pub fn insert(&mut self, offset: usize, text: &str) -> bool {
        self.insert_at(offset, text, Instant::now())
    }

    /// Insert a single character before `offset`.
    pub fn insert_char(&mut self, offset: usize, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.insert(offset, ch.encode_utf8(&mut buf))
    }

    /// Insert `text` before `offset`.
    ///
    /// Offset `len` appends before the EOF sentinel. Returns `false` without touching anything
    /// when `offset > len` or `text` is empty.
    pub fn insert_at(&mut self, offset: usize, text: &str, timestamp: Instant) -> bool {
        let inserted = self.apply_insert(offset, text);
        if inserted == 0 {
            return false;
        }

        self.history
            .record(EditOperation::insert(offset, text, timestamp));
        self.publish(ChangeKind::Inserted, offset, inserted, 0);
        true
    }

    /// Like [`insert`](Self::insert) but reports why nothing happened.
    pub fn try_insert(&mut self, offset: usize, text: &str) -> Result<usize> {
        if !self.is_valid(offset) {
            return Err(self.out_of_range(offset));
        }
        if text.is_empty() {
            return Err(DocumentError::EmptyOperation);
        }

        self.insert(offset, text);
        Ok(text.chars().count())
    }

    /// Delete up to `count` characters at `offset`, timestamped now. See
    /// [`delete_at`](Self::delete_at).
    pub fn delete(&mut self, offset: usize, count: usize) -> usize {
        self.delete_at(offset, count, Instant::now())
    }

    /// Delete up to `count` characters starting at `offset`.
    ///
    /// The range is clamped so the EOF sentinel is never consumed. Returns the number of
    /// characters removed, 0 when `offset >= len` or `count == 0`.
    pub fn delete_at(&mut self, offset: usize, count: usize, timestamp: Instant) -> usize {
        let removed = self.apply_delete(offset, count);
        if removed.is_empty() {
            return 0;
        }

        let removed_len = removed.chars().count();
        self.history
            .record(EditOperation::delete(offset, removed, timestamp));
        self.publish(ChangeKind::Deleted, offset, 0, removed_len);
        removed_len
    }

    /// Like [`delete`](Self::delete) but reports why nothing happened.
    pub fn try_delete(&mut self, offset: usize, count: usize) -> Result<usize> {
        if !self.is_valid(offset) {
            return Err(self.out_of_range(offset));
        }

        match self.delete(offset, count) {
            0 => Err(DocumentError::EmptyOperation),
            removed => Ok(removed),
        }
    }

    // ----- Undo / redo --------------------------------------------------------------------------

    /// Open a batch edit. Nested calls share the outermost batch.
    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
    }

    /// Close one level of batching; the outermost call commits the batch as one transaction.
    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Returns `true` while a batch edit is open.
    pub fn is_batch_edit(&self) -> bool {
        self.history.is_batch_edit()
    }

    /// Stop coalescing typing into the current transaction. Call on caret moves and selection
    /// changes.
    pub fn end_undo_group(&mut self) {
        self.history.end_group();
    }

    /// Returns `true` if there is a transaction to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns `true` if there is a transaction to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Transactions on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Transactions on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Returns `true` if the text matches the last [`mark_clean`](Self::mark_clean) point.
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    /// Mark the current state as clean (call after saving).
    pub fn mark_clean(&mut self) {
        self.history.mark_clean();
    }

    /// Undo the most recent transaction and return the caret offset.
    pub fn undo(&mut self) -> Result<usize> {
        if self.history.is_batch_edit() {
            return Err(DocumentError::BatchInProgress);
        }
        let transaction = self
            .history
            .take_undo()
            .ok_or(DocumentError::NothingToUndo)?;

        for op in transaction.operations().iter().rev() {
            self.apply_operation(&op.inverse());
        }

        let caret = transaction.undo_caret();
        let (offset, inserted, removed) = replay_extent(&transaction, true);
        debug!(ops = transaction.len(), caret, "undo");
        self.history.finish_undo(transaction);
        self.publish(ChangeKind::Undo, offset, inserted, removed);
        Ok(caret)
    }

    /// Redo the most recently undone transaction and return the caret offset.
    pub fn redo(&mut self) -> Result<usize> {
        if self.history.is_batch_edit() {
            return Err(DocumentError::BatchInProgress);
        }
        let transaction = self
            .history
            .take_redo()
            .ok_or(DocumentError::NothingToRedo)?;

        for op in transaction.operations() {
            self.apply_operation(op);
        }

        let caret = transaction.redo_caret();
        let (offset, inserted, removed) = replay_extent(&transaction, false);
        debug!(ops = transaction.len(), caret, "redo");
        self.history.finish_redo(transaction);
        self.publish(ChangeKind::Redo, offset, inserted, removed);
        Ok(caret)
    }

    // ----- Lines and rows -----------------------------------------------------------------------

    /// Number of logical lines, at least 1.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Number of visual rows, at least 1. Equals [`line_count`](Self::line_count) when word
    /// wrap is off.
    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    /// Line containing `offset`. Offsets past the end are clamped to the EOF offset.
    pub fn find_line_number(&self, offset: usize) -> usize {
        self.lines.find_line(offset)
    }

    /// Row containing `offset`. Offsets past the end are clamped to the EOF offset.
    pub fn find_row_number(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        let line = self.lines.find_line(offset);
        let column = offset - self.lines.line_offset(line);
        self.rows.find_row(line, column)
    }

    /// Offset of the first character of `line`; `len` for `line >= line_count`.
    pub fn line_offset(&self, line: usize) -> usize {
        self.lines.line_offset(line)
    }

    /// Offset of the first character of `row`; `len` for `row >= row_count`.
    pub fn row_offset(&self, row: usize) -> usize {
        match self.rows.row_location(row) {
            Some((line, column)) => self.lines.line_offset(line) + column,
            None => self.len(),
        }
    }

    /// Characters in `row`, including a trailing `'\n'`.
    pub fn row_size(&self, row: usize) -> usize {
        if row >= self.row_count() {
            return 0;
        }
        self.row_offset(row + 1) - self.row_offset(row)
    }

    /// Text of `row`, including a trailing `'\n'`.
    pub fn row_text(&self, row: usize) -> String {
        self.store.slice(self.row_offset(row), self.row_size(row))
    }

    /// Text of `line` without its trailing `'\n'`.
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.lines.line_text(line)
    }

    /// `(row, x)` of `offset`, where `x` is the advance width from the start of the row.
    pub fn row_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len());
        let row = self.find_row_number(offset);
        let start = self.row_offset(row);
        let prefix = self.store.slice(start, offset - start);
        (row, str_width(&prefix, self.metrics.as_ref()))
    }

    /// Offset of the character boundary in `row` nearest to horizontal position `x`.
    ///
    /// Rows past the end map to `len`. The caret never lands past the last character of a
    /// wrapped row, since that offset belongs to the next row.
    pub fn offset_at(&self, row: usize, x: usize) -> usize {
        if row >= self.row_count() {
            return self.len();
        }

        let start = self.row_offset(row);
        let text = self.row_text(row);
        let (content, max_column) = match text.strip_suffix('\n') {
            Some(content) => (content, content.chars().count()),
            None if row + 1 == self.row_count() => (text.as_str(), text.chars().count()),
            None => (text.as_str(), text.chars().count().saturating_sub(1)),
        };
        start + column_at_x(content, x, self.metrics.as_ref()).min(max_column)
    }

    // ----- Word wrap ----------------------------------------------------------------------------

    /// Returns `true` if word wrap is enabled.
    pub fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    /// Enable or disable word wrap.
    ///
    /// Enabling analyzes the whole document synchronously, which takes time proportional to its
    /// size. Disabling collapses rows back to lines.
    pub fn set_word_wrap(&mut self, enable: bool) {
        if self.word_wrap == enable {
            return;
        }

        self.word_wrap = enable;
        if enable {
            self.rebuild_rows();
        } else {
            self.rows = RowIndex::unwrapped(self.lines.line_count());
        }
        self.publish(ChangeKind::Layout, 0, 0, 0);
    }

    /// Recompute all row boundaries. Does nothing while word wrap is disabled.
    pub fn analyze_word_wrap(&mut self) {
        if !self.word_wrap {
            return;
        }
        self.rebuild_rows();
        self.publish(ChangeKind::Layout, 0, 0, 0);
    }

    /// Replace the metrics capability (font or viewport change) and re-wrap.
    pub fn set_metrics(&mut self, metrics: impl TextMetrics + 'static) {
        self.metrics = Box::new(metrics);
        if self.word_wrap {
            self.rebuild_rows();
        }
        self.publish(ChangeKind::Layout, 0, 0, 0);
    }

    /// The metrics capability in use.
    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    // ----- Spans --------------------------------------------------------------------------------

    /// Current highlight spans.
    pub fn spans(&self) -> &[Span] {
        self.spans.spans()
    }

    /// Replace all highlight spans.
    pub fn set_spans(&mut self, spans: Vec<Span>) {
        self.spans.set(spans);
        self.publish(ChangeKind::Spans, 0, 0, 0);
    }

    /// Remove all highlight spans.
    pub fn clear_spans(&mut self) {
        self.spans.clear();
        self.publish(ChangeKind::Spans, 0, 0, 0);
    }

    // ----- Notifications ------------------------------------------------------------------------

    /// Monotonic version, incremented by every observable mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register a change callback.
    ///
    /// Callbacks run synchronously inside the mutating call and must not reach back into the
    /// document (for a [`SharedDocument`] that would be a second borrow).
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&DocumentChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a change callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    // ----- Internals ----------------------------------------------------------------------------

    /// Replay a recorded operation. Never touches the history.
    fn apply_operation(&mut self, op: &EditOperation) {
        match op.kind {
            EditKind::Insert => {
                self.apply_insert(op.offset, &op.text);
            }
            EditKind::Delete => {
                self.apply_delete(op.offset, op.len());
            }
        }
    }

    /// Insert into the store and patch the indexes. Never touches the history.
    fn apply_insert(&mut self, offset: usize, text: &str) -> usize {
        let first_line = self.lines.find_line(offset);
        let inserted = self.store.insert(offset, text);
        if inserted == 0 {
            return 0;
        }

        self.lines.insert(offset, text);
        let added_lines = text.matches('\n').count();
        let metrics = self.word_wrap.then_some(self.metrics.as_ref());
        self.rows
            .patch(&self.lines, first_line, 1, 1 + added_lines, metrics);

        if self.config.adjust_spans_on_edit {
            self.spans.shift_for_insertion(offset, inserted);
        }

        debug_assert_eq!(self.store.len(), self.lines.char_count());
        trace!(offset, inserted, "applied insert");
        inserted
    }

    /// Delete from the store and patch the indexes. Never touches the history.
    fn apply_delete(&mut self, offset: usize, count: usize) -> String {
        let first_line = self.lines.find_line(offset);
        let removed = self.store.delete(offset, count);
        if removed.is_empty() {
            return removed;
        }

        let removed_len = removed.chars().count();
        let removed_lines = removed.matches('\n').count();
        self.lines.delete(offset, removed_len);
        let metrics = self.word_wrap.then_some(self.metrics.as_ref());
        self.rows
            .patch(&self.lines, first_line, 1 + removed_lines, 1, metrics);

        if self.config.adjust_spans_on_edit {
            self.spans.shift_for_deletion(offset, removed_len);
        }

        debug_assert_eq!(self.store.len(), self.lines.char_count());
        trace!(offset, removed = removed_len, "applied delete");
        removed
    }

    fn rebuild_rows(&mut self) {
        let started = Instant::now();
        self.rows = RowIndex::analyze(&self.lines, self.metrics.as_ref());
        debug!(
            rows = self.rows.row_count(),
            lines = self.lines.line_count(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "analyzed word wrap"
        );
    }

    fn publish(&mut self, kind: ChangeKind, offset: usize, inserted: usize, removed: usize) {
        self.version += 1;
        if self.subscribers.is_empty() {
            return;
        }

        let change = DocumentChange::new(kind, self.version).with_edit(offset, inserted, removed);
        for (_, callback) in &mut self.subscribers {
            callback(&change);
        }
    }

    fn out_of_range(&self, offset: usize) -> DocumentError {
        DocumentError::OutOfRange {
            offset,
            len: self.len(),
        }
    }
}

/// Lowest offset and total inserted/removed characters of replaying `transaction`.
fn replay_extent(transaction: &Transaction, undo: bool) -> (usize, usize, usize) {
    let mut offset = usize::MAX;
    let mut inserted = 0usize;
    let mut removed = 0usize;

    for op in transaction.operations() {
        offset = offset.min(op.offset);
        let applied_insert = (op.kind == EditKind::Insert) != undo;
        if applied_insert {
            inserted += op.len();
        } else {
            removed += op.len();
        }
    }

    (if offset == usize::MAX { 0 } else { offset }, inserted, removed)
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.store.text())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.len())
            .field("line_count", &self.line_count())
            .field("row_count", &self.row_count())
            .field("word_wrap", &self.word_wrap)
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
