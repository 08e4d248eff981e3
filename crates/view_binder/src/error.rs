//! Domain error enum shared by the binder and page modules.

use thiserror::Error;

/// Errors surfaced by admin UI operations.
///
/// Host adapters report failures as plain strings; they are mapped into
/// [`AdminError::Transport`] at the module boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),
    /// The control channel is not open.
    #[error("WebSocket not open, could not send data")]
    ChannelClosed,
    /// Blob store, upload endpoint or channel failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Malformed inbound or outbound JSON.
    #[error("parse error: {0}")]
    Parse(String),
    /// Zip packing or unpacking failure.
    #[error("archive error: {0}")]
    Archive(String),
}

impl AdminError {
    /// Builds a validation error from a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
