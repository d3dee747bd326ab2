use thiserror::Error;

use crate::protocol::NodeId;

/// Errors surfaced by the DOM access layer.
///
/// Resolution misses are *not* errors (they are `None`/empty results);
/// these variants cover the cases where the layer itself could not
/// answer the question.
#[derive(Debug, Clone, Error)]
pub enum DomError {
    /// The selector string could not be evaluated.
    #[error("invalid selector: {0}")]
    SelectorSyntax(String),

    /// The node handle no longer refers to a live element.
    #[error("node {0} is gone")]
    NodeGone(NodeId),

    /// A frame or document could not be accessed (cross-origin).
    /// Callers treat this as a normal, non-fatal outcome.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The backend does not implement this capability.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A script error raised by the host page during an interaction.
    #[error("host script error: {0}")]
    Script(String),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors from the durable key-value store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}
