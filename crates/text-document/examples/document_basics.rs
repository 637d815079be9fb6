//! Document basics
//!
//! Edits a small document through two cursors, toggles word wrap and walks the undo history.
//! Run with `RUST_LOG=text_document=trace` to see the engine's events.

use text_document::{CellMetrics, Document, DocumentCursor};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let shared = Document::new(CellMetrics::new(16)).into_shared();
    shared.borrow_mut().subscribe(|change| {
        println!(
            "  change: {:?} at {} (+{} -{}) v{}",
            change.kind, change.offset, change.inserted, change.removed, change.version
        );
    });

    let writer = DocumentCursor::new(shared.clone());
    let reader = writer.fork();

    println!("1. Editing:");
    writer.begin_batch();
    writer.insert_before("fn main() {\n", 0);
    writer.insert_before("    println!(\"hello, world\");\n}\n", writer.len());
    writer.end_batch();
    println!("  text:\n{reader}");
    println!("  lines: {}", reader.line_count());

    println!("\n2. Word wrap at 16 cells:");
    writer.set_word_wrap(true);
    for row in 0..reader.row_count() {
        println!("  row {row}: {:?}", reader.row_text(row));
    }

    println!("\n3. Undo / redo:");
    writer.delete_range(0, 3);
    println!("  after delete: {:?}", reader.sub_sequence(0, 12));
    match writer.undo() {
        Ok(caret) => println!("  undo, caret at {caret}"),
        Err(err) => println!("  undo failed: {err}"),
    }
    match writer.undo() {
        Ok(caret) => println!("  undo batch, caret at {caret}, len {}", reader.len()),
        Err(err) => println!("  undo failed: {err}"),
    }
    if let Err(err) = writer.undo() {
        println!("  {err}");
    }
    match writer.redo() {
        Ok(caret) => println!("  redo, caret at {caret}, lines {}", reader.line_count()),
        Err(err) => println!("  redo failed: {err}"),
    }
}
