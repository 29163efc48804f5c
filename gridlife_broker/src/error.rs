//! Broker-side errors.

use thiserror::Error;

/// Failures that abort a simulation request.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A request grid disagrees with its params, or a slice came back
    /// misshapen
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The job queue or a reply channel closed mid-round
    #[error("round aborted: {0}")]
    RoundAborted(String),

    /// Grid construction failed while merging
    #[error(transparent)]
    Core(#[from] gridlife_core::CoreError),
}

impl BrokerError {
    /// Creates a shape mismatch error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Creates a round-aborted error.
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::RoundAborted(msg.into())
    }
}
