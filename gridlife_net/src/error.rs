//! Transport-layer errors.

use thiserror::Error;

/// Errors from the framed transport and the request/response plumbing.
#[derive(Debug, Error)]
pub enum NetError {
    /// Socket-level failure
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode failure
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The session closed while a call was pending
    #[error("connection closed")]
    ConnectionClosed,

    /// A frame exceeded the size limit
    #[error("oversized frame: {0} bytes")]
    OversizedFrame(u64),

    /// The peer answered with an error response
    #[error("remote error: {0}")]
    Remote(String),

    /// The peer answered with a response of the wrong kind
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl NetError {
    /// Creates a remote error from a peer's error response.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates an unexpected-response error.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }
}
