//! Error types for sheetport-remote

use thiserror::Error;

/// Result type alias using [`RemoteError`]
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Errors from the remote sheet client.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Failed to spawn bridge process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Bridge process not running")]
    NotRunning,

    #[error("Failed to send command to bridge: {0}")]
    SendFailed(String),

    #[error("Failed to read response from bridge: {0}")]
    ReadFailed(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Service returned error: {0}")]
    ServiceError(String),

    #[error("Unexpected response data")]
    UnexpectedResponse,

    #[error("Response id {got} does not match request id {expected}")]
    IdMismatch { expected: u64, got: u64 },
}
