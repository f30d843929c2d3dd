//! Relay connectors
//!
//! A connector is the client's only path to a relay. The in-process
//! [`MessageRelay`] is one; network connectors that honour a SOCKS proxy
//! report [`TransportType::Tor`].

use async_trait::async_trait;
use vaultchat_anonymity::TransportType;
use vaultchat_relay::{Message, MessageId, MessageRelay};

use crate::error::Result;

/// Connection to a relay
#[async_trait]
pub trait RelayConnector: Send + Sync {
    /// Store a blob for the holder of `recipient_public_key`
    async fn store(&self, recipient_public_key: &[u8], ciphertext: Vec<u8>) -> Result<MessageId>;

    /// Fetch and clear every pending blob for `recipient_public_key`
    async fn fetch_and_clear(&self, recipient_public_key: &[u8]) -> Result<Vec<Message>>;

    /// How traffic reaches the relay
    fn transport_type(&self) -> TransportType;
}

#[async_trait]
impl RelayConnector for MessageRelay {
    async fn store(&self, recipient_public_key: &[u8], ciphertext: Vec<u8>) -> Result<MessageId> {
        // Clients never attach a sender hint
        Ok(MessageRelay::store(self, recipient_public_key, ciphertext, None)?)
    }

    async fn fetch_and_clear(&self, recipient_public_key: &[u8]) -> Result<Vec<Message>> {
        Ok(MessageRelay::fetch_and_clear(self, recipient_public_key)?)
    }

    fn transport_type(&self) -> TransportType {
        TransportType::Direct
    }
}
