use pretty_assertions::assert_eq;
use text_document::{CellMetrics, Document, DocumentConfig};

fn wrapped(text: &str, width: usize) -> Document {
    let mut doc = Document::with_config(
        text,
        CellMetrics::new(width),
        DocumentConfig::default().with_coalesce_window(None),
    );
    doc.set_word_wrap(true);
    doc
}

fn rows(doc: &Document) -> Vec<String> {
    (0..doc.row_count()).map(|row| doc.row_text(row)).collect()
}

#[test]
fn test_long_word_is_broken_at_viewport_width() {
    let mut doc = wrapped("abcdef", 3);
    assert_eq!(doc.row_count(), 2);
    assert_eq!(rows(&doc), vec!["abc", "def"]);
    assert_eq!(doc.find_row_number(2), 0);
    assert_eq!(doc.find_row_number(3), 1);
    assert_eq!(doc.row_offset(1), 3);

    doc.set_word_wrap(false);
    assert_eq!(doc.row_count(), 1);
    assert_eq!(doc.row_count(), doc.line_count());
}

#[test]
fn test_wrap_prefers_word_boundaries() {
    let doc = wrapped("the quick brown fox", 10);
    assert_eq!(rows(&doc), vec!["the quick ", "brown fox"]);
    assert_eq!(doc.row_size(0), 10);
    assert_eq!(doc.row_size(1), 9);
}

#[test]
fn test_rows_keep_line_breaks() {
    let doc = wrapped("abcdef\nxy", 3);
    assert_eq!(rows(&doc), vec!["abc", "def\n", "xy"]);
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.find_row_number(6), 1);
    assert_eq!(doc.find_row_number(7), 2);
    assert_eq!(doc.row_offset(doc.row_count()), doc.len());
}

#[test]
fn test_zero_width_viewport_disables_wrapping() {
    let doc = wrapped("a very long line of text", 0);
    assert_eq!(doc.row_count(), 1);
}

#[test]
fn test_wide_characters_use_two_cells() {
    let doc = wrapped("你好世界", 4);
    assert_eq!(rows(&doc), vec!["你好", "世界"]);
}

#[test]
fn test_edits_patch_rows() {
    let mut doc = wrapped("hello world", 7);
    assert_eq!(rows(&doc), vec!["hello ", "world"]);

    doc.insert(11, " again and again");
    let fresh = wrapped(&doc.text(), 7);
    assert_eq!(rows(&doc), rows(&fresh));

    doc.delete(0, 6);
    let fresh = wrapped(&doc.text(), 7);
    assert_eq!(rows(&doc), rows(&fresh));

    doc.insert(3, "\n");
    let fresh = wrapped(&doc.text(), 7);
    assert_eq!(rows(&doc), rows(&fresh));
}

#[test]
fn test_set_metrics_rewraps() {
    let mut doc = wrapped("abcdefghij", 5);
    assert_eq!(doc.row_count(), 2);

    doc.set_metrics(CellMetrics::new(2));
    assert_eq!(doc.row_count(), 5);

    doc.set_metrics(CellMetrics::new(20));
    assert_eq!(doc.row_count(), 1);
}

#[test]
fn test_analyze_word_wrap_is_idempotent() {
    let mut doc = wrapped("one two three four five", 8);
    let before = rows(&doc);
    doc.analyze_word_wrap();
    assert_eq!(rows(&doc), before);
}

#[test]
fn test_row_column_and_offset_at() {
    let doc = wrapped("abcdef\nxy", 3);
    assert_eq!(doc.row_column(4), (1, 1));
    assert_eq!(doc.offset_at(1, 1), 4);
    // Past the right edge of a wrapped row the caret stays on that row.
    assert_eq!(doc.offset_at(0, 10), 2);
    // On a row ending with a line break it stops before the break.
    assert_eq!(doc.offset_at(1, 10), 6);
    assert_eq!(doc.offset_at(2, 10), 9);
    assert_eq!(doc.offset_at(9, 0), doc.len());
}
