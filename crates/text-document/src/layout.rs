//! Row Layout (Word Wrap)
//!
//! Splits each logical line into visual rows that fit the viewport width reported by a
//! [`TextMetrics`] capability. The engine never measures glyphs itself: the metrics object says
//! how wide each character is and how wide the viewport is, in whatever unit the renderer uses.
//!
//! Row boundaries are stored per line as wrap points (character index within the line where a
//! continuation row starts), plus a cumulative table of each line's first row. Offset→row and
//! row→offset lookups are binary searches over those tables. Patching after an edit re-wraps
//! only the touched lines, but re-basing the cumulative table is linear in the number of lines
//! that follow the edit.

use crate::line_index::LineIndex;
use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) for [`CellMetrics`].
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Character measurement capability supplied by the rendering layer.
pub trait TextMetrics {
    /// Advance width of `ch`.
    fn char_width(&self, ch: char) -> usize;

    /// Width available to a row. Zero disables wrapping.
    fn viewport_width(&self) -> usize;
}

/// Monospace cell metrics based on UAX #11 (`unicode-width`).
///
/// Narrow characters take one cell, wide CJK/emoji characters take two, and `'\t'` takes
/// `tab_width` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    /// Viewport width in cells.
    pub viewport_width: usize,
    /// Width of a tab in cells.
    pub tab_width: usize,
}

impl CellMetrics {
    /// Cell metrics for a viewport `viewport_width` cells wide.
    pub fn new(viewport_width: usize) -> Self {
        Self {
            viewport_width,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Override the tab width.
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }
}

impl TextMetrics for CellMetrics {
    fn char_width(&self, ch: char) -> usize {
        if ch == '\t' {
            self.tab_width
        } else {
            UnicodeWidthChar::width(ch).unwrap_or(1)
        }
    }

    fn viewport_width(&self) -> usize {
        self.viewport_width
    }
}

/// Compute the wrap points of a single logical line (without its `'\n'`).
///
/// A row ends at the last word boundary (the position after a whitespace character) before the
/// accumulated width would exceed the viewport. A word wider than the viewport is broken
/// mid-word. Whitespace may hang past the edge and never starts a continuation row on its own.
/// A character wider than the whole viewport gets a row to itself.
pub fn calculate_wrap_points(line: &str, metrics: &dyn TextMetrics) -> Vec<usize> {
    let viewport_width = metrics.viewport_width();
    if viewport_width == 0 {
        return Vec::new();
    }

    let mut wrap_points = Vec::new();
    let mut segment_start = 0usize;
    let mut segment_start_x = 0usize;
    let mut last_break: Option<(usize, usize)> = None; // (char_index, x_in_line)
    let mut x_in_line = 0usize;

    for (char_index, ch) in line.chars().enumerate() {
        let width = metrics.char_width(ch);
        let is_space = ch.is_whitespace();

        while !is_space {
            let x_in_segment = x_in_line - segment_start_x;
            if x_in_segment.saturating_add(width) <= viewport_width {
                break;
            }

            if let Some((break_index, break_x)) = last_break
                && break_index > segment_start
            {
                wrap_points.push(break_index);
                segment_start = break_index;
                segment_start_x = break_x;
                last_break = None;
                continue;
            }

            if char_index > segment_start {
                wrap_points.push(char_index);
                segment_start = char_index;
                segment_start_x = x_in_line;
            }
            last_break = None;
            break;
        }

        x_in_line = x_in_line.saturating_add(width);
        if is_space {
            last_break = Some((char_index + 1, x_in_line));
        }
    }

    wrap_points
}

/// Total advance width of `text`.
pub fn str_width(text: &str, metrics: &dyn TextMetrics) -> usize {
    text.chars()
        .fold(0usize, |x, ch| x.saturating_add(metrics.char_width(ch)))
}

/// Column (in chars) of the character boundary in `row_text` nearest to horizontal position `x`.
pub fn column_at_x(row_text: &str, x: usize, metrics: &dyn TextMetrics) -> usize {
    let mut acc = 0usize;
    for (column, ch) in row_text.chars().enumerate() {
        let width = metrics.char_width(ch);
        // Left half of a glyph snaps to its leading edge.
        if x.saturating_mul(2) < acc.saturating_mul(2).saturating_add(width) {
            return column;
        }
        acc = acc.saturating_add(width);
    }
    row_text.chars().count()
}

/// Visual row index over all logical lines.
#[derive(Debug, Clone)]
pub struct RowIndex {
    /// Wrap points for each logical line.
    line_wraps: Vec<Vec<usize>>,
    /// `first_rows[line]` is the first row of `line`; the final entry is the row count.
    first_rows: Vec<usize>,
}

impl RowIndex {
    /// Row index for a single empty line.
    pub fn new() -> Self {
        Self::unwrapped(1)
    }

    /// One row per line.
    pub fn unwrapped(line_count: usize) -> Self {
        let mut index = Self {
            line_wraps: vec![Vec::new(); line_count.max(1)],
            first_rows: Vec::new(),
        };
        index.rebase_from(0);
        index
    }

    /// Wrap every line of `lines` against `metrics`.
    pub fn analyze(lines: &LineIndex, metrics: &dyn TextMetrics) -> Self {
        let line_wraps = (0..lines.line_count())
            .map(|line| wrap_line(lines, line, metrics))
            .collect();
        let mut index = Self {
            line_wraps,
            first_rows: Vec::new(),
        };
        index.rebase_from(0);
        index
    }

    /// Replace the wrap data of `removed` lines starting at `first_line` with freshly computed
    /// wrap data for `inserted` lines of the already patched `lines`.
    pub fn patch(
        &mut self,
        lines: &LineIndex,
        first_line: usize,
        removed: usize,
        inserted: usize,
        metrics: Option<&dyn TextMetrics>,
    ) {
        let first_line = first_line.min(self.line_wraps.len());
        let removed_end = first_line
            .saturating_add(removed)
            .min(self.line_wraps.len());
        let old_rows = self.first_rows[removed_end] - self.first_rows[first_line];

        let fresh: Vec<Vec<usize>> = (first_line..first_line + inserted)
            .map(|line| match metrics {
                Some(metrics) => wrap_line(lines, line, metrics),
                None => Vec::new(),
            })
            .collect();
        let new_rows: usize = fresh.iter().map(|wraps| wraps.len() + 1).sum();

        self.line_wraps.splice(first_line..removed_end, fresh);
        if removed_end - first_line == inserted && old_rows == new_rows {
            return;
        }
        self.rebase_from(first_line);
    }

    /// Total number of rows, always at least 1.
    pub fn row_count(&self) -> usize {
        self.first_rows.last().copied().unwrap_or(1)
    }

    /// Number of logical lines known to the index.
    pub fn line_count(&self) -> usize {
        self.line_wraps.len()
    }

    /// First row of `line`.
    pub fn line_first_row(&self, line: usize) -> usize {
        self.first_rows[line.min(self.line_wraps.len())]
    }

    /// Row containing character `column` of `line`.
    pub fn find_row(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.line_wraps.len() - 1);
        let wraps = &self.line_wraps[line];
        self.first_rows[line] + wraps.partition_point(|&wrap| wrap <= column)
    }

    /// `(line, start_column)` of `row`, or `None` past the last row.
    pub fn row_location(&self, row: usize) -> Option<(usize, usize)> {
        if row >= self.row_count() {
            return None;
        }

        let line = self.first_rows.partition_point(|&first| first <= row) - 1;
        let nth = row - self.first_rows[line];
        let column = if nth == 0 {
            0
        } else {
            self.line_wraps[line][nth - 1]
        };
        Some((line, column))
    }

    /// Recompute `first_rows` for `line` and every line after it.
    fn rebase_from(&mut self, line: usize) {
        let line = line.min(self.first_rows.len().saturating_sub(1));
        self.first_rows.truncate(line + 1);
        if self.first_rows.is_empty() {
            self.first_rows.push(0);
        }

        let mut next = self.first_rows[line];
        for wraps in &self.line_wraps[line..] {
            next += wraps.len() + 1;
            self.first_rows.push(next);
        }
    }
}

impl Default for RowIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_line(lines: &LineIndex, line: usize, metrics: &dyn TextMetrics) -> Vec<usize> {
    lines
        .line_text(line)
        .map(|text| calculate_wrap_points(&text, metrics))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(width: usize) -> CellMetrics {
        CellMetrics::new(width)
    }

    #[test]
    fn test_cell_metrics_widths() {
        let metrics = cells(80).with_tab_width(8);
        assert_eq!(metrics.char_width('a'), 1);
        assert_eq!(metrics.char_width('你'), 2);
        assert_eq!(metrics.char_width('\t'), 8);
        assert_eq!(str_width("ab你", &metrics), 4);
    }

    #[test]
    fn test_forced_break_without_separators() {
        assert_eq!(calculate_wrap_points("abcdef", &cells(3)), vec![3]);
        assert_eq!(calculate_wrap_points("abcdefg", &cells(3)), vec![3, 6]);
    }

    #[test]
    fn test_exact_fit_does_not_wrap() {
        assert!(calculate_wrap_points("1234567890", &cells(10)).is_empty());
    }

    #[test]
    fn test_prefers_word_boundary() {
        // "hello " + "world" rather than "hello w" + "orld".
        assert_eq!(calculate_wrap_points("hello world", &cells(7)), vec![6]);
    }

    #[test]
    fn test_whitespace_hangs_past_edge() {
        assert_eq!(calculate_wrap_points("hello world", &cells(5)), vec![6]);
        assert_eq!(calculate_wrap_points("ab      ", &cells(3)), Vec::<usize>::new());
    }

    #[test]
    fn test_long_word_after_space_breaks_mid_word() {
        // "ab " then "cdefgh" does not fit in 4 cells and is split.
        assert_eq!(calculate_wrap_points("ab cdefgh", &cells(4)), vec![3, 7]);
    }

    #[test]
    fn test_wide_char_moves_to_next_row() {
        assert_eq!(calculate_wrap_points("Hello你", &cells(6)), vec![5]);
    }

    #[test]
    fn test_char_wider_than_viewport_gets_own_row() {
        assert_eq!(calculate_wrap_points("你a", &cells(1)), vec![1]);
    }

    #[test]
    fn test_zero_width_viewport_disables_wrapping() {
        assert!(calculate_wrap_points("abcdef", &cells(0)).is_empty());
    }

    #[test]
    fn test_column_at_x_snaps_to_nearest_boundary() {
        let metrics = cells(80);
        assert_eq!(column_at_x("abc", 0, &metrics), 0);
        assert_eq!(column_at_x("abc", 2, &metrics), 2);
        assert_eq!(column_at_x("abc", 10, &metrics), 3);
        // '你' spans cells 1..3; cell 1 is its left half, cell 2 its right half.
        assert_eq!(column_at_x("a你b", 1, &metrics), 1);
        assert_eq!(column_at_x("a你b", 2, &metrics), 2);
    }

    #[test]
    fn test_row_index_analyze() {
        let lines = LineIndex::from_text("12345\n1234567890abc\nhello");
        let rows = RowIndex::analyze(&lines, &cells(10));

        assert_eq!(rows.row_count(), 4);
        assert_eq!(rows.line_first_row(1), 1);
        assert_eq!(rows.line_first_row(2), 3);
        assert_eq!(rows.find_row(1, 9), 1);
        assert_eq!(rows.find_row(1, 10), 2);
        assert_eq!(rows.row_location(2), Some((1, 10)));
        assert_eq!(rows.row_location(3), Some((2, 0)));
        assert_eq!(rows.row_location(4), None);
    }

    #[test]
    fn test_unwrapped_index_matches_lines() {
        let rows = RowIndex::unwrapped(3);
        assert_eq!(rows.row_count(), 3);
        assert_eq!(rows.row_location(2), Some((2, 0)));
        assert_eq!(RowIndex::new().row_count(), 1);
    }

    #[test]
    fn test_patch_rewraps_touched_lines_only() {
        let metrics = cells(3);
        let mut lines = LineIndex::from_text("ab\ncd\nef");
        let mut rows = RowIndex::analyze(&lines, &metrics);
        assert_eq!(rows.row_count(), 3);

        // "cd" -> "cdxyz" wraps into two rows.
        lines.insert(5, "xyz");
        rows.patch(&lines, 1, 1, 1, Some(&metrics));
        assert_eq!(rows.row_count(), 4);
        assert_eq!(rows.line_first_row(2), 3);

        // Split line 0 into two lines.
        lines.insert(1, "\n");
        rows.patch(&lines, 0, 1, 2, Some(&metrics));
        assert_eq!(rows.line_count(), 4);
        assert_eq!(rows.row_count(), 5);
        assert_eq!(rows.row_location(4), Some((3, 0)));
    }
}
