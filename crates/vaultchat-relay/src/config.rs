//! Relay configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{RelayError, Result};

/// Upper bound on message TTL (one year)
const MAX_MESSAGE_TTL_SECS: u64 = 365 * 24 * 3600;

/// Relay configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Message time-to-live in seconds
    pub message_ttl_secs: u64,
    /// Expiry jitter in minutes, drawn uniformly from `[-j, +j]` per message
    pub ttl_jitter_minutes: u32,
    /// Maximum accepted ciphertext size
    pub max_ciphertext_size: usize,
    /// Expiry reaper interval in seconds
    pub cleanup_interval_secs: u64,
    /// Storage backend
    pub storage: StorageBackend,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            message_ttl_secs: crate::DEFAULT_MESSAGE_TTL_SECS,
            ttl_jitter_minutes: crate::DEFAULT_TTL_JITTER_MINUTES,
            max_ciphertext_size: crate::MAX_CIPHERTEXT_SIZE,
            cleanup_interval_secs: 3600,
            storage: StorageBackend::Memory,
        }
    }
}

impl RelayConfig {
    /// Get message TTL as Duration
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    /// Get reaper interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_ciphertext_size == 0 {
            return Err(RelayError::Configuration(
                "max_ciphertext_size must be > 0".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(RelayError::Configuration(
                "cleanup_interval_secs must be > 0".to_string(),
            ));
        }
        if self.message_ttl_secs > MAX_MESSAGE_TTL_SECS {
            return Err(RelayError::Configuration(format!(
                "message_ttl_secs must be <= {}",
                MAX_MESSAGE_TTL_SECS
            )));
        }
        if u64::from(self.ttl_jitter_minutes) * 60 > self.message_ttl_secs {
            return Err(RelayError::Configuration(
                "ttl_jitter_minutes must not exceed message_ttl_secs".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the relay keeps pending messages
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-memory store, lost on restart
    Memory,
    /// Persistent sled database
    Sled {
        /// Database directory
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.message_ttl(), Duration::from_secs(604_800));
        assert_eq!(config.ttl_jitter_minutes, 60);
    }

    #[test]
    fn test_jitter_larger_than_ttl_rejected() {
        let config = RelayConfig {
            message_ttl_secs: 600,
            ttl_jitter_minutes: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ttl_too_large_rejected() {
        let config = RelayConfig {
            message_ttl_secs: u64::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_allowed() {
        let config = RelayConfig {
            message_ttl_secs: 0,
            ttl_jitter_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_serde() {
        let backend = StorageBackend::Sled {
            path: PathBuf::from("/var/lib/vaultchat"),
        };
        let json = serde_json::to_string(&backend).unwrap();
        assert_eq!(json, r#"{"type":"sled","path":"/var/lib/vaultchat"}"#);
    }
}
