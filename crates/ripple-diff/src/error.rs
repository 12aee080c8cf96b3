//! Error types for the diff crate.

use ripple_types::IndexError;

/// Errors that can occur while converting between patches and diffs.
///
/// Every variant means the input did not describe a consistent change of
/// the collection it was paired with; a wrong patch is never produced
/// silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A patch operation addressed an index that does not exist.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Undoing the prior operations of a patch did not yield a source index.
    #[error("cannot resolve source index of {op}")]
    UnresolvedSource { op: String },

    /// An updated element has no position in the final collection.
    #[error("updated index {index} has no position in the final collection")]
    UnresolvedUpdate { index: String },

    /// The final collection has no element where the diff expects one.
    #[error("no element at {index} in the final collection")]
    MissingElement { index: String },

    /// The diff contradicts itself.
    #[error("inconsistent diff: {0}")]
    Inconsistent(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
