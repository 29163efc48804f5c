//! Error types for the core grid library.

use thiserror::Error;

/// Errors from grid construction, shape validation and snapshot I/O.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cell buffer or slice does not match its declared dimensions
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A grid snapshot file could not be read or written
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A grid snapshot file is not a well-formed binary PGM
    #[error("malformed grid snapshot: {0}")]
    Format(String),
}

impl CoreError {
    /// Creates a shape mismatch error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Creates a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}
