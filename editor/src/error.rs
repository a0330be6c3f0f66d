//! Editor error type.
//!
//! Out-of-range numeric values never produce an error: they are clamped on
//! write. The variants below are the conditions a caller must react to.

use crate::doc::ElementRef;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    /// The referenced element does not exist in its collection.
    #[error("element not found: {0}")]
    NotFound(ElementRef),
    /// The operation needs a template and none is loaded.
    #[error("no template loaded")]
    NoTemplate,
    /// A template load finished after a newer load was started.
    #[error("stale template load: ticket {ticket} superseded by {latest}")]
    StaleTemplateLoad { ticket: u64, latest: u64 },
    /// A textual element reference did not have the `<kind>-<id>` form.
    #[error("invalid element reference: {0:?}")]
    InvalidElementRef(String),
    /// A gesture step arrived while a different gesture (or none) was active.
    #[error("gesture mismatch: expected {expected}, active {active}")]
    GestureMismatch { expected: &'static str, active: &'static str },
}
