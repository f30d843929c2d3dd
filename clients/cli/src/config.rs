//! CLI configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vaultchat_anonymity::AnonymityConfig;
use vaultchat_relay::config::StorageBackend;
use vaultchat_relay::RelayConfig;

/// CLI configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Relay settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// Client-side obfuscation and proxy settings
    #[serde(default)]
    pub anonymity: AnonymityConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultchat")
            .join("relay");

        Self {
            relay: RelayConfig {
                storage: StorageBackend::Sled { path },
                ..Default::default()
            },
            anonymity: AnonymityConfig::default(),
        }
    }
}

impl CliConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultchat")
            .join("config.toml")
    }

    /// Load config from file or create default
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            let config = Self::default();
            config.save(path)?;
            config
        };

        config.relay.validate()?;
        config.anonymity.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_written_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let written = CliConfig::load_or_default(&path).unwrap();
        assert!(path.exists());

        let loaded = CliConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.relay.message_ttl_secs, written.relay.message_ttl_secs);
        assert!(matches!(loaded.relay.storage, StorageBackend::Sled { .. }));
        assert!(loaded.anonymity.obfuscation.padding_enabled);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[relay]\nmessage_ttl_secs = 3600\nttl_jitter_minutes = 5\nmax_ciphertext_size = 1024\ncleanup_interval_secs = 60\n\n[relay.storage]\ntype = \"memory\"\n",
        )
        .unwrap();

        let config = CliConfig::load_or_default(&path).unwrap();
        assert_eq!(config.relay.message_ttl_secs, 3600);
        assert!(matches!(config.relay.storage, StorageBackend::Memory));
        assert_eq!(config.anonymity.proxy.socks_addr, "127.0.0.1:9050");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[relay]\nmessage_ttl_secs = 60\nttl_jitter_minutes = 60\nmax_ciphertext_size = 1024\ncleanup_interval_secs = 60\n\n[relay.storage]\ntype = \"memory\"\n",
        )
        .unwrap();

        assert!(CliConfig::load_or_default(&path).is_err());
    }
}
