//! Document cursors.
//!
//! A [`DocumentCursor`] is a view over a [`SharedDocument`]: it holds an iteration position and
//! nothing else. Any number of cursors can point at the same document. A cursor is not told about
//! edits made through another cursor or directly on the document; its position is only
//! revalidated on the next [`seek`](DocumentCursor::seek). Subscribe on the document if you need
//! to react to edits.
//!
//! # Example
//!
//! ```rust
//! use text_document::{CellMetrics, Document, DocumentCursor};
//!
//! let shared = Document::with_text("hey", CellMetrics::new(80)).into_shared();
//! let mut cursor = DocumentCursor::new(shared.clone());
//!
//! cursor.seek(1);
//! let rest: String = cursor.by_ref().collect();
//! assert_eq!(rest, "ey");
//!
//! let other = cursor.fork();
//! other.insert_before("!", 3);
//! assert_eq!(shared.borrow().text(), "hey!");
//! ```
//!
//! # Panics
//!
//! Cursor methods borrow the shared document. Calling them from inside a change callback of the
//! same document panics, as the document is already mutably borrowed there.

use crate::document::{Document, SharedDocument};
use crate::error::Result;
use crate::layout::TextMetrics;
use crate::spans::Span;
use crate::storage::NULL_CHAR;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Iterator and editing handle over a shared document.
#[derive(Clone)]
pub struct DocumentCursor {
    doc: SharedDocument,
    /// Current position, `None` after seeking to an invalid offset.
    position: Option<usize>,
}

impl DocumentCursor {
    /// Cursor at offset 0 of `doc`.
    pub fn new(doc: SharedDocument) -> Self {
        Self {
            doc,
            position: Some(0),
        }
    }

    /// Cursor over a new, empty document.
    pub fn with_metrics(metrics: impl TextMetrics + 'static) -> Self {
        Self::new(Document::new(metrics).into_shared())
    }

    /// Another cursor over the same document, positioned at 0.
    pub fn fork(&self) -> Self {
        Self::new(Rc::clone(&self.doc))
    }

    /// The shared document.
    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    // ----- Iteration ----------------------------------------------------------------------------

    /// Move to `offset`. Returns the new position, or `None` (and stops iteration) if `offset`
    /// is outside `[0, len]`.
    pub fn seek(&mut self, offset: usize) -> Option<usize> {
        self.position = self.doc.borrow().is_valid(offset).then_some(offset);
        self.position
    }

    /// Current position, `None` after an invalid seek.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns `true` if there is a character (other than EOF) at the current position.
    pub fn has_next(&self) -> bool {
        self.position
            .is_some_and(|position| position < self.doc.borrow().len())
    }

    /// Return the character at the current position and advance.
    ///
    /// Callers check [`has_next`](Self::has_next) first. At the EOF offset this yields the EOF
    /// sentinel; after an invalid seek it yields [`NULL_CHAR`] and does not move.
    pub fn next_char(&mut self) -> char {
        let Some(position) = self.position else {
            return NULL_CHAR;
        };
        let ch = self.doc.borrow().char_at(position);
        self.position = Some(position + 1);
        ch
    }

    // ----- Reading ------------------------------------------------------------------------------

    /// Number of characters, excluding the EOF sentinel.
    pub fn len(&self) -> usize {
        self.doc.borrow().len()
    }

    /// Returns `true` if the document holds no characters.
    pub fn is_empty(&self) -> bool {
        self.doc.borrow().is_empty()
    }

    /// Character at `offset`, or [`NULL_CHAR`] outside `[0, len]`.
    pub fn char_at(&self, offset: usize) -> char {
        self.doc.borrow().char_at(offset)
    }

    /// Up to `max_chars` characters starting at `offset`.
    pub fn sub_sequence(&self, offset: usize, max_chars: usize) -> String {
        self.doc.borrow().sub_sequence(offset, max_chars)
    }

    /// Line containing `offset`.
    pub fn find_line_number(&self, offset: usize) -> usize {
        self.doc.borrow().find_line_number(offset)
    }

    /// Row containing `offset`.
    pub fn find_row_number(&self, offset: usize) -> usize {
        self.doc.borrow().find_row_number(offset)
    }

    /// First offset of `line`.
    pub fn line_offset(&self, line: usize) -> usize {
        self.doc.borrow().line_offset(line)
    }

    /// First offset of `row`.
    pub fn row_offset(&self, row: usize) -> usize {
        self.doc.borrow().row_offset(row)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.doc.borrow().line_count()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.doc.borrow().row_count()
    }

    /// Characters in `row`.
    pub fn row_size(&self, row: usize) -> usize {
        self.doc.borrow().row_size(row)
    }

    /// Text of `row`.
    pub fn row_text(&self, row: usize) -> String {
        self.doc.borrow().row_text(row)
    }

    // ----- Editing ------------------------------------------------------------------------------

    /// Insert `text` before `offset`. Invalid offsets and empty text are ignored.
    pub fn insert_before(&self, text: &str, offset: usize) -> bool {
        self.doc.borrow_mut().insert(offset, text)
    }

    /// Insert `text` before `offset` with an explicit timestamp (for typing coalescing).
    pub fn insert_before_at(&self, text: &str, offset: usize, timestamp: Instant) -> bool {
        self.doc.borrow_mut().insert_at(offset, text, timestamp)
    }

    /// Insert one character before `offset`.
    pub fn insert_char_before(&self, ch: char, offset: usize) -> bool {
        self.doc.borrow_mut().insert_char(offset, ch)
    }

    /// Delete the character at `offset`.
    pub fn delete_at(&self, offset: usize) -> usize {
        self.doc.borrow_mut().delete(offset, 1)
    }

    /// Delete up to `max_chars` characters starting at `offset`.
    pub fn delete_range(&self, offset: usize, max_chars: usize) -> usize {
        self.doc.borrow_mut().delete(offset, max_chars)
    }

    /// Delete up to `max_chars` characters with an explicit timestamp.
    pub fn delete_range_at(&self, offset: usize, max_chars: usize, timestamp: Instant) -> usize {
        self.doc.borrow_mut().delete_at(offset, max_chars, timestamp)
    }

    /// See [`Document::begin_batch`].
    pub fn begin_batch(&self) {
        self.doc.borrow_mut().begin_batch();
    }

    /// See [`Document::end_batch`].
    pub fn end_batch(&self) {
        self.doc.borrow_mut().end_batch();
    }

    /// See [`Document::is_batch_edit`].
    pub fn is_batch_edit(&self) -> bool {
        self.doc.borrow().is_batch_edit()
    }

    /// See [`Document::undo`].
    pub fn undo(&self) -> Result<usize> {
        self.doc.borrow_mut().undo()
    }

    /// See [`Document::redo`].
    pub fn redo(&self) -> Result<usize> {
        self.doc.borrow_mut().redo()
    }

    /// See [`Document::can_undo`].
    pub fn can_undo(&self) -> bool {
        self.doc.borrow().can_undo()
    }

    /// See [`Document::can_redo`].
    pub fn can_redo(&self) -> bool {
        self.doc.borrow().can_redo()
    }

    /// See [`Document::end_undo_group`].
    pub fn end_undo_group(&self) {
        self.doc.borrow_mut().end_undo_group();
    }

    /// See [`Document::is_clean`].
    pub fn is_clean(&self) -> bool {
        self.doc.borrow().is_clean()
    }

    /// See [`Document::mark_clean`].
    pub fn mark_clean(&self) {
        self.doc.borrow_mut().mark_clean();
    }

    // ----- Spans and layout ---------------------------------------------------------------------

    /// Snapshot of the current spans.
    pub fn spans(&self) -> Vec<Span> {
        self.doc.borrow().spans().to_vec()
    }

    /// Replace all spans.
    pub fn set_spans(&self, spans: Vec<Span>) {
        self.doc.borrow_mut().set_spans(spans);
    }

    /// Remove all spans.
    pub fn clear_spans(&self) {
        self.doc.borrow_mut().clear_spans();
    }

    /// Returns `true` if word wrap is on.
    pub fn word_wrap(&self) -> bool {
        self.doc.borrow().word_wrap()
    }

    /// See [`Document::set_word_wrap`].
    pub fn set_word_wrap(&self, enable: bool) {
        self.doc.borrow_mut().set_word_wrap(enable);
    }

    /// See [`Document::analyze_word_wrap`].
    pub fn analyze_word_wrap(&self) {
        self.doc.borrow_mut().analyze_word_wrap();
    }

    /// See [`Document::set_metrics`].
    pub fn set_metrics(&self, metrics: impl TextMetrics + 'static) {
        self.doc.borrow_mut().set_metrics(metrics);
    }
}

impl Iterator for DocumentCursor {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.has_next().then(|| self.next_char())
    }
}

impl fmt::Display for DocumentCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.doc.borrow(), f)
    }
}

impl fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("position", &self.position)
            .field("len", &self.len())
            .finish()
    }
}
