//! Transport client
//!
//! Send path: establish session key, seal, pad, wait, store.
//! Receive path: establish session key, fetch and clear, unpad, open.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use vaultchat_anonymity::{AnonymityConfig, TrafficObfuscator, TransportType};
use vaultchat_crypto::{aead, SessionKey, SessionKeyManager};
use vaultchat_relay::MessageId;

use crate::connector::RelayConnector;
use crate::error::{ClientError, Result};

/// A message taken from the relay
#[derive(Debug)]
pub struct ReceivedMessage {
    /// Relay message ID
    pub id: MessageId,
    /// Relay store time
    pub created_at: DateTime<Utc>,
    /// Decrypted plaintext, or why this message could not be opened
    pub plaintext: Result<Vec<u8>>,
}

/// Transport client for one local identity
pub struct TransportClient {
    config: AnonymityConfig,
    sessions: SessionKeyManager,
    obfuscator: TrafficObfuscator,
    connector: Arc<dyn RelayConnector>,
}

impl TransportClient {
    /// Create a client with a fresh key pair
    pub fn new(config: AnonymityConfig, connector: Arc<dyn RelayConnector>) -> Result<Self> {
        Self::with_sessions(config, SessionKeyManager::new(), connector)
    }

    /// Create a client around an existing session manager
    pub fn with_sessions(
        config: AnonymityConfig,
        sessions: SessionKeyManager,
        connector: Arc<dyn RelayConnector>,
    ) -> Result<Self> {
        config.validate()?;

        if config.proxy.enabled && connector.transport_type() != TransportType::Tor {
            return Err(ClientError::Configuration(format!(
                "proxy {} required but connector is {:?}",
                config.proxy.socks_addr,
                connector.transport_type()
            )));
        }

        Ok(Self {
            obfuscator: TrafficObfuscator::new(config.obfuscation.clone())?,
            config,
            sessions,
            connector,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &AnonymityConfig {
        &self.config
    }

    /// Local public key, to be published for peers
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.sessions.public_key_bytes()
    }

    /// Session cache
    pub fn sessions(&self) -> &SessionKeyManager {
        &self.sessions
    }

    /// Seal `plaintext` for a peer and hand it to the relay
    ///
    /// Dropping the future during the delay transmits nothing.
    #[instrument(skip(self, peer_public_key, plaintext), fields(peer = %peer_id))]
    pub async fn send(
        &self,
        peer_id: &str,
        peer_public_key: &[u8],
        plaintext: &[u8],
    ) -> Result<MessageId> {
        let key = self.sessions.establish(peer_id, peer_public_key)?;
        let sealed = aead::seal(&key, plaintext)?;
        let blob = self.obfuscator.wrap(sealed)?;

        self.obfuscator.delay().await;

        let id = self.connector.store(peer_public_key, blob).await?;
        debug!("Sent message {}", id);
        Ok(id)
    }

    /// Take every pending message and open it with the peer's session key
    ///
    /// Failures are reported per message. A bad peer key fails the whole
    /// call before anything is fetched.
    #[instrument(skip(self, peer_public_key), fields(peer = %peer_id))]
    pub async fn receive(
        &self,
        peer_id: &str,
        peer_public_key: &[u8],
    ) -> Result<Vec<ReceivedMessage>> {
        let key = self.sessions.establish(peer_id, peer_public_key)?;
        let messages = self
            .connector
            .fetch_and_clear(&self.public_key_bytes())
            .await?;

        let received: Vec<_> = messages
            .into_iter()
            .map(|message| {
                let plaintext = self.open_blob(&key, &message.ciphertext);
                if let Err(e) = &plaintext {
                    warn!("Discarding message {}: {}", message.id, e);
                }
                ReceivedMessage {
                    id: message.id,
                    created_at: message.created_at,
                    plaintext,
                }
            })
            .collect();

        debug!("Received {} messages", received.len());
        Ok(received)
    }

    fn open_blob(&self, key: &SessionKey, blob: &[u8]) -> Result<Vec<u8>> {
        let sealed = self.obfuscator.classify(blob).into_payload()?;
        Ok(aead::open(key, &sealed)?)
    }
}
