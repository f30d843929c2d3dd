//! Configuration for anonymity layer

use serde::{Deserialize, Serialize};

use crate::envelope::{DEFAULT_ENVELOPE_SIZE, LENGTH_PREFIX_SIZE, MAX_ENVELOPE_SIZE};
use crate::error::{AnonymityError, Result};

/// Anonymity layer configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnonymityConfig {
    /// Traffic obfuscation settings
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,
    /// Anonymizing proxy settings
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl AnonymityConfig {
    /// Configuration with padding and delays disabled, for tests and local demos
    pub fn direct() -> Self {
        Self {
            obfuscation: ObfuscationConfig::disabled(),
            proxy: ProxyConfig::default(),
        }
    }

    /// Configuration for maximum privacy
    pub fn maximum_privacy() -> Self {
        Self {
            obfuscation: ObfuscationConfig {
                padding_enabled: true,
                envelope_size: DEFAULT_ENVELOPE_SIZE,
                delays_enabled: true,
                min_delay_ms: 500,
                max_delay_ms: 5000,
            },
            proxy: ProxyConfig {
                enabled: true,
                ..Default::default()
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.obfuscation.validate()?;
        self.proxy.validate()
    }
}

/// Traffic obfuscation configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObfuscationConfig {
    /// Pad sealed blobs to a fixed envelope size
    pub padding_enabled: bool,
    /// Fixed envelope size in bytes
    pub envelope_size: usize,
    /// Sleep for a random delay before each send
    pub delays_enabled: bool,
    /// Minimum delay before a send (milliseconds)
    pub min_delay_ms: u64,
    /// Maximum delay before a send (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            padding_enabled: true,
            envelope_size: DEFAULT_ENVELOPE_SIZE,
            delays_enabled: true,
            min_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl ObfuscationConfig {
    /// No padding and no delays
    pub fn disabled() -> Self {
        Self {
            padding_enabled: false,
            delays_enabled: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.envelope_size <= LENGTH_PREFIX_SIZE {
            return Err(AnonymityError::Configuration(format!(
                "envelope_size must be > {}",
                LENGTH_PREFIX_SIZE
            )));
        }
        if self.envelope_size > MAX_ENVELOPE_SIZE {
            return Err(AnonymityError::Configuration(format!(
                "envelope_size must be <= {}",
                MAX_ENVELOPE_SIZE
            )));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(AnonymityError::Configuration(
                "min_delay_ms must be <= max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Anonymizing proxy configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Require relay traffic to go through the proxy
    pub enabled: bool,
    /// Tor SOCKS proxy address
    pub socks_addr: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            socks_addr: "127.0.0.1:9050".to_string(),
        }
    }
}

impl ProxyConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.socks_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(AnonymityError::Configuration(format!(
                "invalid socks_addr: {}",
                self.socks_addr
            )));
        }
        Ok(())
    }
}
