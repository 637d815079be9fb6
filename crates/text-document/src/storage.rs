//! Character Storage Layer
//!
//! Stores the document as a gap buffer of `char`s. The gap follows the most recent edit point,
//! so runs of typing or backspacing at one place cost O(1) amortized per character; moving the
//! gap costs O(distance).
//!
//! Offsets are counted in Unicode scalar values. The valid offset range is `[0, len]`, where
//! `len` addresses the End-Of-File sentinel ([`EOF_CHAR`]). The sentinel is never stored, never
//! deleted and cannot be overwritten.

use crate::error::{DocumentError, Result};

/// Sentinel returned when reading at offset `len`.
pub const EOF_CHAR: char = '\u{FFFF}';

/// Sentinel returned by lenient reads at an offset past the EOF sentinel.
pub const NULL_CHAR: char = '\0';

/// Default size of the gap allocated up front and after each growth.
pub const DEFAULT_GAP_SIZE: usize = 64;

/// Gap buffer holding the document characters.
#[derive(Debug, Clone)]
pub struct GapBuffer {
    /// Physical storage: `buf[..gap_start]` and `buf[gap_end..]` hold text, the rest is the gap.
    buf: Vec<char>,
    gap_start: usize,
    gap_end: usize,
    /// Minimum gap size to reserve when growing.
    min_gap: usize,
}

impl GapBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self::with_gap_size(text, DEFAULT_GAP_SIZE)
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Create a buffer holding `text`, reserving a gap of `gap_size` characters at the end.
    pub fn with_gap_size(text: &str, gap_size: usize) -> Self {
        let min_gap = gap_size.max(1);
        let mut buf: Vec<char> = text.chars().collect();
        let gap_start = buf.len();
        buf.resize(gap_start + min_gap, NULL_CHAR);

        Self {
            gap_end: buf.len(),
            buf,
            gap_start,
            min_gap,
        }
    }

    /// Number of characters, excluding the EOF sentinel.
    pub fn len(&self) -> usize {
        self.buf.len() - self.gap_len()
    }

    /// Returns `true` if the buffer holds no characters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `offset` lies in `[0, len]`.
    pub fn is_valid(&self, offset: usize) -> bool {
        offset <= self.len()
    }

    /// Strict read: the character at `offset`, [`EOF_CHAR`] at `len`, an error beyond.
    pub fn get(&self, offset: usize) -> Result<char> {
        if !self.is_valid(offset) {
            return Err(DocumentError::OutOfRange {
                offset,
                len: self.len(),
            });
        }
        Ok(self.char_at(offset))
    }

    /// Lenient read: like [`get`](Self::get) but returns [`NULL_CHAR`] past the EOF sentinel.
    pub fn char_at(&self, offset: usize) -> char {
        let len = self.len();
        if offset < len {
            self.buf[self.physical(offset)]
        } else if offset == len {
            EOF_CHAR
        } else {
            NULL_CHAR
        }
    }

    /// Insert `text` before `offset`.
    ///
    /// Offset `len` appends before the EOF sentinel. Returns the number of characters inserted,
    /// which is 0 when `offset > len` or `text` is empty.
    pub fn insert(&mut self, offset: usize, text: &str) -> usize {
        if text.is_empty() || !self.is_valid(offset) {
            return 0;
        }

        let chars: Vec<char> = text.chars().collect();
        self.reserve_gap(chars.len());
        self.move_gap(offset);

        let end = self.gap_start + chars.len();
        self.buf[self.gap_start..end].copy_from_slice(&chars);
        self.gap_start = end;
        chars.len()
    }

    /// Delete up to `count` characters starting at `offset` and return them.
    ///
    /// The range is clamped at the EOF sentinel, so deleting at `len` removes nothing.
    pub fn delete(&mut self, offset: usize, count: usize) -> String {
        let len = self.len();
        if count == 0 || offset >= len {
            return String::new();
        }

        let count = count.min(len - offset);
        self.move_gap(offset);
        let removed: String = self.buf[self.gap_end..self.gap_end + count].iter().collect();
        self.gap_end += count;
        removed
    }

    /// Up to `max_chars` characters starting at `offset`, clamped to the document length.
    pub fn slice(&self, offset: usize, max_chars: usize) -> String {
        let len = self.len();
        if offset >= len {
            return String::new();
        }

        let end = offset.saturating_add(max_chars).min(len);
        let (head, tail) = self.range_slices(offset, end);
        head.iter().chain(tail).collect()
    }

    /// The whole content.
    pub fn text(&self) -> String {
        self.slice(0, self.len())
    }

    /// Current gap size (for tests and diagnostics).
    pub fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Map a logical offset (`< len`) to its index in `buf`.
    fn physical(&self, offset: usize) -> usize {
        if offset < self.gap_start {
            offset
        } else {
            offset + self.gap_len()
        }
    }

    /// Logical range `[start, end)` as at most two contiguous slices.
    fn range_slices(&self, start: usize, end: usize) -> (&[char], &[char]) {
        let gap_len = self.gap_len();
        if end <= self.gap_start {
            (&self.buf[start..end], &[])
        } else if start >= self.gap_start {
            (&self.buf[start + gap_len..end + gap_len], &[])
        } else {
            (
                &self.buf[start..self.gap_start],
                &self.buf[self.gap_end..end + gap_len],
            )
        }
    }

    /// Move the gap so that it starts at logical `offset`.
    fn move_gap(&mut self, offset: usize) {
        if offset < self.gap_start {
            let count = self.gap_start - offset;
            self.buf
                .copy_within(offset..self.gap_start, self.gap_end - count);
            self.gap_start = offset;
            self.gap_end -= count;
        } else if offset > self.gap_start {
            let count = offset - self.gap_start;
            self.buf
                .copy_within(self.gap_end..self.gap_end + count, self.gap_start);
            self.gap_start += count;
            self.gap_end += count;
        }
    }

    /// Make sure the gap can hold at least `needed` characters.
    ///
    /// Growth is geometric in the content size so repeated inserts stay amortized O(1).
    fn reserve_gap(&mut self, needed: usize) {
        if self.gap_len() >= needed {
            return;
        }

        let new_gap = needed.max(self.len() / 2).max(self.min_gap);
        let tail_len = self.buf.len() - self.gap_end;
        let mut grown = Vec::with_capacity(self.len() + new_gap);
        grown.extend_from_slice(&self.buf[..self.gap_start]);
        grown.resize(self.gap_start + new_gap, NULL_CHAR);
        grown.extend_from_slice(&self.buf[self.gap_end..]);

        self.buf = grown;
        self.gap_end = self.buf.len() - tail_len;
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gap_buffer() {
        let buf = GapBuffer::new("Hello, World!");
        assert_eq!(buf.text(), "Hello, World!");
        assert_eq!(buf.len(), 13);
    }

    #[test]
    fn test_empty_gap_buffer() {
        let buf = GapBuffer::empty();
        assert_eq!(buf.text(), "");
        assert!(buf.is_empty());
        assert_eq!(buf.char_at(0), EOF_CHAR);
    }

    #[test]
    fn test_insert_at_start() {
        let mut buf = GapBuffer::new("World");
        assert_eq!(buf.insert(0, "Hello, "), 7);
        assert_eq!(buf.text(), "Hello, World");
    }

    #[test]
    fn test_insert_at_end_appends_before_eof() {
        let mut buf = GapBuffer::new("Hello");
        assert_eq!(buf.insert(5, ", World"), 7);
        assert_eq!(buf.text(), "Hello, World");
        assert_eq!(buf.char_at(12), EOF_CHAR);
    }

    #[test]
    fn test_insert_past_eof_is_noop() {
        let mut buf = GapBuffer::new("Hello");
        assert_eq!(buf.insert(6, "x"), 0);
        assert_eq!(buf.text(), "Hello");
    }

    #[test]
    fn test_insert_empty_is_noop() {
        let mut buf = GapBuffer::new("Hello");
        assert_eq!(buf.insert(2, ""), 0);
        assert_eq!(buf.text(), "Hello");
    }

    #[test]
    fn test_delete_in_middle() {
        let mut buf = GapBuffer::new("Hello, World");
        assert_eq!(buf.delete(5, 2), ", ");
        assert_eq!(buf.text(), "HelloWorld");
    }

    #[test]
    fn test_delete_is_clamped_at_eof() {
        let mut buf = GapBuffer::new("abc");
        assert_eq!(buf.delete(1, 100), "bc");
        assert_eq!(buf.text(), "a");
        assert_eq!(buf.delete(1, 1), "");
        assert_eq!(buf.delete(0, 0), "");
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_reads_around_gap() {
        let mut buf = GapBuffer::new("abcdef");
        buf.insert(3, "XY");
        // Gap now sits after "abcXY".
        assert_eq!(buf.char_at(4), 'Y');
        assert_eq!(buf.char_at(5), 'd');
        assert_eq!(buf.slice(2, 4), "cXYd");
        assert_eq!(buf.slice(6, 100), "ef");
    }

    #[test]
    fn test_strict_get() {
        let buf = GapBuffer::new("ab");
        assert_eq!(buf.get(1), Ok('b'));
        assert_eq!(buf.get(2), Ok(EOF_CHAR));
        assert_eq!(
            buf.get(3),
            Err(DocumentError::OutOfRange { offset: 3, len: 2 })
        );
        assert_eq!(buf.char_at(3), NULL_CHAR);
    }

    #[test]
    fn test_gap_growth() {
        let mut buf = GapBuffer::with_gap_size("", 2);
        for (i, ch) in "the quick brown fox".chars().enumerate() {
            buf.insert(i, &ch.to_string());
        }
        assert_eq!(buf.text(), "the quick brown fox");
        buf.insert(0, "0123456789");
        assert_eq!(buf.text(), "0123456789the quick brown fox");
    }

    #[test]
    fn test_utf8_multibyte() {
        let mut buf = GapBuffer::new("你好");
        assert_eq!(buf.len(), 2);
        buf.insert(1, "们");
        assert_eq!(buf.text(), "你们好");
        assert_eq!(buf.delete(0, 1), "你");
        assert_eq!(buf.char_at(0), '们');
    }

    #[test]
    fn test_slice_clamping() {
        let buf = GapBuffer::new("Hello");
        assert_eq!(buf.slice(3, 10), "lo");
        assert_eq!(buf.slice(5, 10), "");
        assert_eq!(buf.slice(9, 1), "");
    }
}
