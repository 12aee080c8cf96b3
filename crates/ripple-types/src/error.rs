use thiserror::Error;

use crate::path::IndexPath;

/// Errors produced when an index does not address an element.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("index path {0} does not address a node")]
    InvalidPath(IndexPath),

    #[error("the empty index path cannot be edited")]
    EmptyPath,

    #[error("node at {0} has no {1}")]
    KindMismatch(IndexPath, &'static str),

    /// Several sources of one move address the same element, or one lies
    /// inside another.
    #[error("overlapping move sources: {0}")]
    OverlappingSources(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
