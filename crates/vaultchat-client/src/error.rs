//! Client error types

use thiserror::Error;
use vaultchat_anonymity::AnonymityError;
use vaultchat_crypto::CryptoError;
use vaultchat_relay::RelayError;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Crypto error
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Envelope or obfuscation error
    #[error(transparent)]
    Anonymity(#[from] AnonymityError),

    /// Relay error
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error kinds callers branch on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Message is malformed or failed authentication; discard it
    Authentication,
    /// Peer public key is unusable
    InvalidKey,
    /// Payload does not fit the envelope or relay limit
    Oversize,
    /// Recipient unknown
    NotFound,
    /// Storage failed; retry with backoff
    StorageUnavailable,
    /// Anything else
    Other,
}

impl ClientError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Crypto(CryptoError::Authentication) => ErrorKind::Authentication,
            ClientError::Crypto(CryptoError::InvalidKey(_)) => ErrorKind::InvalidKey,
            ClientError::Anonymity(AnonymityError::Oversize { .. }) => ErrorKind::Oversize,
            ClientError::Anonymity(AnonymityError::Truncated { .. }) => ErrorKind::Authentication,
            ClientError::Relay(RelayError::BlobTooLarge { .. }) => ErrorKind::Oversize,
            ClientError::Relay(RelayError::RecipientNotFound(_)) => ErrorKind::NotFound,
            ClientError::Relay(RelayError::StorageUnavailable(_)) => ErrorKind::StorageUnavailable,
            _ => ErrorKind::Other,
        }
    }
}
