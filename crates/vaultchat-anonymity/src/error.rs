//! Error types for anonymity layer

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, AnonymityError>;

/// Anonymity layer errors
#[derive(Debug, Error)]
pub enum AnonymityError {
    /// Payload does not fit in the fixed envelope
    #[error("Payload too large: {size} bytes exceeds envelope capacity {capacity}")]
    Oversize { size: usize, capacity: usize },

    /// Envelope declares more payload than it carries
    #[error("Truncated envelope: declares {declared} bytes, {available} available")]
    Truncated { declared: usize, available: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}
