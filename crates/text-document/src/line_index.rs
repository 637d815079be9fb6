//! Logical Line Index
//!
//! Maps character offsets to logical lines (paragraphs separated by `'\n'`) using a [`Rope`]
//! mirror of the document, which keeps both directions of the mapping O(log N) and patches in
//! O(log N) per edit.
//!
//! The crate enables ropey without its `unicode_lines`/`cr_lines` features, so `'\n'` is the
//! only separator. The separator belongs to the line it terminates; the EOF offset belongs to
//! the last line, which is empty when the document ends with `'\n'`.

use ropey::Rope;

/// Logical line index.
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Index for an empty document: a single empty line.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build the index from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Number of lines, always at least 1.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Number of indexed characters.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line containing `offset`. Offsets past the end map to the last line.
    pub fn find_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Offset of the first character of `line`.
    ///
    /// `line_count()` (and anything beyond) yields the document length, so the end of the last
    /// line can be queried as `line_offset(line + 1)`.
    pub fn line_offset(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Character count of `line`, including its trailing `'\n'`.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        self.rope.line(line).len_chars()
    }

    /// Text of `line` without its trailing `'\n'`.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }

        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Mirror an insertion of `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    /// Mirror a deletion of `count` characters at `offset`.
    pub fn delete(&mut self, offset: usize, count: usize) {
        let start = offset.min(self.rope.len_chars());
        let end = start.saturating_add(count).min(self.rope.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Complete indexed text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
