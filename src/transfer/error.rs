use thiserror::Error;

/// Errors that terminate a transfer session.
///
/// A malformed head frame or a protocol violation is fatal to the session
/// that saw it; I/O errors cover both the connection and the filesystem.
/// No variant ever crosses session boundaries: the accept loop logs the
/// error and keeps serving other connections.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("malformed head frame: {0}")]
    MalformedHead(#[from] serde_json::Error),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransferError>;
