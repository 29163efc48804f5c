//! Controller-side errors.

use thiserror::Error;

/// Failures that abort the controller's run.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The broker link failed
    #[error("broker link failed: {0}")]
    Link(#[from] gridlife_net::NetError),

    /// A snapshot could not be read or written
    #[error("snapshot failed: {0}")]
    Image(#[from] gridlife_core::CoreError),

    /// The run ended abnormally
    #[error("run aborted: {0}")]
    Aborted(String),
}

impl ControllerError {
    /// Creates a run-aborted error.
    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::Aborted(msg.into())
    }
}
