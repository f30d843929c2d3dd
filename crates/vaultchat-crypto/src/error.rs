//! Error types for cryptographic operations

use thiserror::Error;

/// Result type alias for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealed blob is malformed or its tag did not verify.
    ///
    /// Deliberately carries no detail about which check failed.
    #[error("Message authentication failed")]
    Authentication,

    /// Peer public key is not a usable X25519 point
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    /// Key derivation failed
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed
    #[error("Encryption failed")]
    EncryptionFailed,
}

