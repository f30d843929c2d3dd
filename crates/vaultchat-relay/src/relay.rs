//! Read-once message relay
//!
//! The relay addresses recipients only by the hash of their public key and
//! treats ciphertext as opaque bytes. A stored message is delivered to at
//! most one fetch, then deleted.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::config::{RelayConfig, StorageBackend};
use crate::error::{RelayError, Result};
use crate::storage::{
    MemoryMessageStore, Message, MessageId, MessageStore, NewMessage, RecipientHash,
    SledMessageStore, StorageStats,
};

/// Message relay
pub struct MessageRelay {
    config: RelayConfig,
    store: Arc<dyn MessageStore>,
}

impl MessageRelay {
    /// Create a relay over an existing store
    pub fn new(config: RelayConfig, store: Arc<dyn MessageStore>) -> Self {
        Self { config, store }
    }

    /// Create a relay with an in-memory store and default settings
    pub fn in_memory() -> Self {
        Self::new(RelayConfig::default(), Arc::new(MemoryMessageStore::new()))
    }

    /// Validate config and open the configured storage backend
    pub fn open(config: RelayConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn MessageStore> = match &config.storage {
            StorageBackend::Memory => Arc::new(MemoryMessageStore::new()),
            StorageBackend::Sled { path } => {
                info!("Opening relay database at {}", path.display());
                Arc::new(SledMessageStore::open(path)?)
            }
        };

        Ok(Self::new(config, store))
    }

    /// Configuration in use
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Store an opaque blob for the holder of `recipient_public_key`
    ///
    /// `sender_hint` is kept alongside the blob but never authenticated.
    #[instrument(skip_all, fields(size = ciphertext.len()))]
    pub fn store(
        &self,
        recipient_public_key: &[u8],
        ciphertext: Vec<u8>,
        sender_hint: Option<String>,
    ) -> Result<MessageId> {
        if ciphertext.len() > self.config.max_ciphertext_size {
            return Err(RelayError::BlobTooLarge {
                size: ciphertext.len(),
                max: self.config.max_ciphertext_size,
            });
        }

        let recipient_hash = RecipientHash::from_public_key(recipient_public_key);
        let created_at = Utc::now();
        let expires_at = self.expiry_for(created_at);

        let id = self.store.append(NewMessage {
            recipient_hash,
            ciphertext,
            sender_hint,
            created_at,
            expires_at,
        })?;

        debug!("Stored message {} for {}", id, recipient_hash.short());
        Ok(id)
    }

    /// Return and delete every live message for `recipient_public_key`
    ///
    /// Unknown recipients get an empty list; the relay cannot tell "never
    /// had messages" from "already fetched".
    #[instrument(skip_all)]
    pub fn fetch_and_clear(&self, recipient_public_key: &[u8]) -> Result<Vec<Message>> {
        let recipient_hash = RecipientHash::from_public_key(recipient_public_key);
        let messages = self.store.take_live(&recipient_hash, Utc::now())?;

        debug!(
            "Delivered {} messages to {}",
            messages.len(),
            recipient_hash.short()
        );
        Ok(messages)
    }

    /// Physically delete expired messages
    pub fn purge_expired(&self) -> Result<usize> {
        self.store.purge_expired(Utc::now())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats> {
        self.store.stats(Utc::now())
    }

    fn expiry_for(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let jitter = i64::from(self.config.ttl_jitter_minutes);
        let offset = rand::thread_rng().gen_range(-jitter..=jitter);

        now + Duration::seconds(self.config.message_ttl_secs as i64) + Duration::minutes(offset)
    }
}
