#![warn(missing_docs)]
//! Text Document - Headless Document Engine for Text Editors
//!
//! # Overview
//!
//! `text-document` is the mutable backing store of an on-screen text editor. It stores the
//! characters, indexes them by logical line and by visual row under word wrap, keeps highlight
//! spans for the renderer and records every edit for multi-step undo/redo. It does no rendering
//! and no glyph measurement: the UI layer supplies a [`TextMetrics`] capability and consumes the
//! row/line boundaries the engine exposes.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DocumentCursor (many per document)         │  ← Provider-facing view
//! ├─────────────────────────────────────────────┤
//! │  Document (aggregate, change notifications) │  ← All mutation goes here
//! ├──────────────────────┬──────────────────────┤
//! │  UndoHistory         │  SpanRegistry        │
//! ├──────────────────────┴──────────────────────┤
//! │  RowIndex (word wrap) over LineIndex (rope) │  ← Offset ↔ line/row
//! ├─────────────────────────────────────────────┤
//! │  GapBuffer + EOF sentinel                   │  ← Character storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use text_document::{CellMetrics, Document, DocumentError};
//!
//! let mut doc = Document::new(CellMetrics::new(80));
//!
//! doc.begin_batch();
//! doc.insert(0, "fn main() {\n");
//! doc.insert(12, "}\n");
//! doc.end_batch();
//! assert_eq!(doc.line_count(), 3);
//!
//! // The batch is undone in one step.
//! assert_eq!(doc.undo(), Ok(0));
//! assert!(doc.is_empty());
//! assert_eq!(doc.undo(), Err(DocumentError::NothingToUndo));
//! ```
//!
//! # Offsets and the EOF sentinel
//!
//! Offsets count Unicode scalar values. Valid offsets are `[0, len]`; offset `len` reads as
//! [`EOF_CHAR`] and is a valid insertion point (append). Insertions past `len`, deletions at
//! `len` and empty edits are silent no-ops; the `try_*` methods report the reason instead.
//!
//! # Threading
//!
//! The engine is single-threaded. Cursors share a document through
//! [`SharedDocument`] (`Rc<RefCell<Document>>`); multi-threaded use needs external locking.

pub mod change;
pub mod config;
pub mod cursor;
pub mod document;
pub mod error;
pub mod history;
pub mod layout;
pub mod line_index;
pub mod spans;
pub mod storage;

pub use change::{ChangeKind, DocumentChange, SubscriptionId};
pub use config::DocumentConfig;
pub use cursor::DocumentCursor;
pub use document::{Document, SharedDocument};
pub use error::{DocumentError, Result};
pub use history::{EditKind, EditOperation, Transaction, UndoHistory};
pub use layout::{CellMetrics, RowIndex, TextMetrics};
pub use line_index::LineIndex;
pub use spans::{Span, SpanRegistry, StyleId};
pub use storage::{EOF_CHAR, GapBuffer, NULL_CHAR};
