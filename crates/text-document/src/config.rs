//! Document configuration.

use crate::storage::DEFAULT_GAP_SIZE;
use std::time::Duration;

/// Default bound on the number of undoable transactions.
pub const DEFAULT_MAX_TRANSACTIONS: usize = 1000;

/// Default window within which contiguous single edits share one transaction.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_secs(1);

/// Tunables for a [`Document`](crate::Document).
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use text_document::DocumentConfig;
///
/// let config = DocumentConfig::default()
///     .with_max_transactions(200)
///     .with_coalesce_window(Some(Duration::from_millis(500)));
/// assert_eq!(config.max_transactions, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Maximum number of transactions kept on the undo stack; the oldest are evicted first.
    pub max_transactions: usize,
    /// Coalescing window for implicit transactions. `None` commits every edit on its own.
    pub coalesce_window: Option<Duration>,
    /// Shift highlight spans on insert/delete instead of leaving them stale.
    pub adjust_spans_on_edit: bool,
    /// Initial gap size of the character store.
    pub initial_capacity: usize,
}

impl DocumentConfig {
    /// Set [`max_transactions`](Self::max_transactions).
    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions.max(1);
        self
    }

    /// Set [`coalesce_window`](Self::coalesce_window).
    pub fn with_coalesce_window(mut self, window: Option<Duration>) -> Self {
        self.coalesce_window = window;
        self
    }

    /// Set [`adjust_spans_on_edit`](Self::adjust_spans_on_edit).
    pub fn with_span_adjustment(mut self, enabled: bool) -> Self {
        self.adjust_spans_on_edit = enabled;
        self
    }

    /// Set [`initial_capacity`](Self::initial_capacity).
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_transactions: DEFAULT_MAX_TRANSACTIONS,
            coalesce_window: Some(DEFAULT_COALESCE_WINDOW),
            adjust_spans_on_edit: false,
            initial_capacity: DEFAULT_GAP_SIZE,
        }
    }
}
