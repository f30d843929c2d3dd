//! Request handling at the relay boundary
//!
//! Callers address recipients by user ID; the service resolves IDs to public
//! keys through an [`IdentityLookup`] and forwards to the [`MessageRelay`].
//! Ciphertext crosses the boundary as hex.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::{RelayError, Result};
use crate::identity::{user_tag, IdentityLookup};
use crate::relay::MessageRelay;
use crate::storage::{Message, StorageStats};

/// Relay request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayRequest {
    /// Deposit a message for a user
    Send {
        /// Recipient user ID
        recipient: String,
        /// Hex-encoded ciphertext
        ciphertext: String,
        /// Untrusted sender hint
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<String>,
    },
    /// Fetch and clear all pending messages for a user
    Receive {
        /// Recipient user ID
        user_id: String,
    },
    /// Storage statistics
    Stats,
}

/// A delivered message as seen on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message ID
    pub id: u64,
    /// Hex-encoded ciphertext
    pub ciphertext: String,
    /// Untrusted sender hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Store time
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.0,
            ciphertext: hex::encode(&message.ciphertext),
            sender_id: message.sender_hint,
            timestamp: message.created_at,
        }
    }
}

/// Relay response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayResponse {
    /// Message stored
    Sent {
        /// Assigned message ID
        message_id: u64,
    },
    /// Pending messages, now deleted from the relay
    Messages {
        /// Messages in arrival order
        messages: Vec<WireMessage>,
    },
    /// Storage statistics
    Stats {
        /// Stats snapshot
        stats: StorageStats,
    },
    /// Request failed
    Error {
        /// Stable error code
        code: String,
        /// Human-readable message
        message: String,
    },
}

impl RelayResponse {
    /// Build an error response from a relay error
    pub fn error(err: &RelayError) -> Self {
        RelayResponse::Error {
            code: error_code(err).to_string(),
            message: err.to_string(),
        }
    }
}

fn error_code(err: &RelayError) -> &'static str {
    match err {
        RelayError::StorageUnavailable(_) => "storage_unavailable",
        RelayError::BlobTooLarge { .. } => "blob_too_large",
        RelayError::RecipientNotFound(_) => "recipient_not_found",
        RelayError::InvalidRequest(_) => "invalid_request",
        RelayError::Configuration(_) => "configuration",
    }
}

/// Relay service
pub struct RelayService {
    relay: Arc<MessageRelay>,
    identities: Arc<dyn IdentityLookup>,
}

impl RelayService {
    /// Create a new service
    pub fn new(relay: Arc<MessageRelay>, identities: Arc<dyn IdentityLookup>) -> Self {
        Self { relay, identities }
    }

    /// Underlying relay
    pub fn relay(&self) -> &Arc<MessageRelay> {
        &self.relay
    }

    /// Handle one request
    pub fn handle(&self, request: RelayRequest) -> RelayResponse {
        let result = match request {
            RelayRequest::Send {
                recipient,
                ciphertext,
                sender_id,
            } => self
                .send(&recipient, &ciphertext, sender_id)
                .map(|message_id| RelayResponse::Sent { message_id }),
            RelayRequest::Receive { user_id } => self
                .receive(&user_id)
                .map(|messages| RelayResponse::Messages { messages }),
            RelayRequest::Stats => self.relay.stats().map(|stats| RelayResponse::Stats { stats }),
        };

        result.unwrap_or_else(|e| {
            warn!("Request failed: {}", e);
            RelayResponse::error(&e)
        })
    }

    fn send(&self, recipient: &str, ciphertext: &str, sender_id: Option<String>) -> Result<u64> {
        let ciphertext = hex::decode(ciphertext)
            .map_err(|e| RelayError::InvalidRequest(format!("ciphertext is not hex: {}", e)))?;

        let public_key = self.resolve(recipient)?;
        let id = self.relay.store(&public_key, ciphertext, sender_id)?;
        Ok(id.0)
    }

    fn receive(&self, user_id: &str) -> Result<Vec<WireMessage>> {
        let public_key = self.resolve(user_id)?;
        let messages = self.relay.fetch_and_clear(&public_key)?;
        Ok(messages.into_iter().map(WireMessage::from).collect())
    }

    fn resolve(&self, user_id: &str) -> Result<Vec<u8>> {
        self.identities
            .lookup_public_key(user_id)?
            .ok_or_else(|| RelayError::RecipientNotFound(user_tag(user_id)))
    }
}

/// Spawn the expiry reaper
///
/// Purges expired messages every `interval` until the handle is aborted.
pub fn spawn_reaper(relay: Arc<MessageRelay>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);

        loop {
            interval.tick().await;

            match relay.purge_expired() {
                Ok(count) if count > 0 => {
                    info!("Reaped {} expired messages", count);
                }
                Err(e) => {
                    error!("Reaper failed: {}", e);
                }
                _ => {}
            }
        }
    })
}
