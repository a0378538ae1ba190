//! Opaque extraction target

/// Read-only view of the host page
///
/// The agent and the annotation engine only see the page through this
/// trait; selectors and markup are someone else's problem. Row indices are
/// DOM order and stable for the lifetime of one call sequence.
pub trait PageSurface: Send + Sync {
    /// Raw text of the open email's subject container, if present
    fn open_subject(&self) -> Option<String>;

    /// Raw text of the open email's body container, if present
    fn open_body(&self) -> Option<String>;

    /// Number of candidate listing rows currently in the DOM
    fn row_count(&self) -> usize;

    /// Raw text of row `index`'s subject sub-element, if present
    fn row_subject(&self, index: usize) -> Option<String>;

    /// Raw text of row `index`'s snippet sub-element, if present
    fn row_snippet(&self, index: usize) -> Option<String>;
}
