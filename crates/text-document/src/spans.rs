//! Highlight span registry.
//!
//! A span marks the character offset where a run of a given category starts; the run extends to
//! the next span. Categories are opaque ids chosen by the consumer (usually a tokenizer).
//!
//! Spans live outside the undo history. By default they are not adjusted when the text changes,
//! so spans past an edit point may be stale until the consumer replaces them. Shifting can be
//! enabled through [`DocumentConfig::adjust_spans_on_edit`](crate::DocumentConfig).

/// Consumer-defined category of a span.
pub type StyleId = u32;

/// A highlight marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start character offset.
    pub start: usize,
    /// Category tag.
    pub category: StyleId,
}

impl Span {
    /// Create a span.
    pub fn new(start: usize, category: StyleId) -> Self {
        Self { start, category }
    }
}

/// Unordered collection of spans.
#[derive(Debug, Clone, Default)]
pub struct SpanRegistry {
    spans: Vec<Span>,
}

impl SpanRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all spans.
    pub fn set(&mut self, spans: Vec<Span>) {
        self.spans = spans;
    }

    /// Current spans, in the order they were supplied.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Remove all spans.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Shift spans at or after `offset` right by `len`.
    pub fn shift_for_insertion(&mut self, offset: usize, len: usize) {
        for span in &mut self.spans {
            if span.start >= offset {
                span.start += len;
            }
        }
    }

    /// Move spans after a deleted range `[offset, offset + len)` left.
    ///
    /// Spans starting in `[offset, offset + len]` land on `offset`. Only the one with the
    /// greatest original start survives, as its category covers the character that now sits at
    /// `offset`. Input order does not matter.
    pub fn shift_for_deletion(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }

        let end = offset + len;
        // (original start, index) of the surviving span.
        let mut survivor: Option<(usize, usize)> = None;
        let mut landed = 0usize;

        for (idx, span) in self.spans.iter_mut().enumerate() {
            if span.start < offset {
                continue;
            }
            if span.start > end {
                span.start -= len;
                continue;
            }

            if survivor.is_none_or(|(start, _)| span.start >= start) {
                survivor = Some((span.start, idx));
            }
            span.start = offset;
            landed += 1;
        }

        let Some((_, keep)) = survivor else {
            return;
        };
        if landed < 2 {
            return;
        }

        let mut idx = 0usize;
        self.spans.retain(|span| {
            let retain = idx == keep || span.start != offset;
            idx += 1;
            retain
        });
    }
}
