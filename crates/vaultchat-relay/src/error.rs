//! Relay error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    /// Storage collaborator failed; callers may retry with backoff
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Ciphertext too large
    #[error("Ciphertext too large: {size} bytes exceeds maximum {max}")]
    BlobTooLarge { size: usize, max: usize },

    /// Identity lookup found nothing; carries a short tag of the hashed ID
    #[error("Recipient unknown: {0}")]
    RecipientNotFound(String),

    /// Malformed boundary request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sled::Error> for RelayError {
    fn from(err: sled::Error) -> Self {
        RelayError::StorageUnavailable(err.to_string())
    }
}

impl From<bincode::Error> for RelayError {
    fn from(err: bincode::Error) -> Self {
        RelayError::StorageUnavailable(format!("corrupt record: {}", err))
    }
}
