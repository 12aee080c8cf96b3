use ripple_diff::DiffError;
use ripple_types::IndexError;

/// Errors produced by changesets and containers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangesetError {
    /// A mutator addressed an index that does not exist.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Deriving the missing half of a changeset failed.
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// Container configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias used throughout the changeset crate.
pub type ChangesetResult<T> = std::result::Result<T, ChangesetError>;
