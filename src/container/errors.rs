//! # Container Writer Errors

use std::io;

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Container file errors
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Record rejected by the encoder; the open block is untouched
    #[error(transparent)]
    Encode(#[from] SchemaError),

    #[error("Invalid container config: {0}")]
    InvalidConfig(String),

    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ContainerError {
    /// Whether the writer can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ContainerError::Encode(e) if e.is_mismatch())
    }
}
