//! Error types for the content-addressed mirror.

use crate::types::Digest;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by source mirroring, reconciliation and staging.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A member could not be opened or read during hashing or copying.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A member could not be copied; the cause may be on either end.
    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The declared ref disagrees with the freshly computed digest during fetch.
    #[error("Files imported from {path} have sha256sum '{actual}', not '{expected}'")]
    RefMismatch {
        path: String,
        expected: Digest,
        actual: Digest,
    },

    /// Fetch was invoked on a source that has never been tracked.
    #[error("Source {0} has no ref; run track before fetch")]
    MissingRef(String),

    /// A ref string is not a 64-character lowercase hex SHA-256 digest.
    #[error("Invalid ref '{0}': expected 64 lowercase hex characters")]
    InvalidRef(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A defensive check failed; indicates a logic bug rather than user error.
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Mirror store or staging I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Attach path context to an I/O error from a member read.
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Read {
            path: path.into(),
            source,
        }
    }

    /// Attach both endpoints to an I/O error from a member copy.
    pub(crate) fn copy(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        SourceError::Copy {
            from: from.into(),
            to: to.into(),
            source,
        }
    }
}
