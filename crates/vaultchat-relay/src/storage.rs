//! Relay storage for pending messages
//!
//! Messages are keyed by recipient hash and kept in arrival order. The one
//! operation with a concurrency contract is [`MessageStore::take_live`]: it
//! must select and delete in a single atomic unit so that two concurrent
//! fetches for the same recipient never both receive the same message.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sled::transaction::TransactionError;
use tracing::{debug, info};

use crate::error::{RelayError, Result};

/// SHA-256 of a recipient public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientHash(#[serde(with = "hex::serde")] [u8; 32]);

impl RecipientHash {
    /// Hash a recipient public key. Total over any byte string.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(Sha256::digest(public_key).into())
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex prefix, for logs
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for RecipientHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientHash({})", hex::encode(self.0))
    }
}

impl fmt::Display for RecipientHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Message identifier; increases with arrival order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message about to be appended
#[derive(Clone, Debug)]
pub struct NewMessage {
    /// Recipient address
    pub recipient_hash: RecipientHash,
    /// Opaque ciphertext
    pub ciphertext: Vec<u8>,
    /// Untrusted sender hint, never used for trust decisions
    pub sender_hint: Option<String>,
    /// Store time
    pub created_at: DateTime<Utc>,
    /// Expiry, fixed at store time
    pub expires_at: DateTime<Utc>,
}

/// A stored message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: MessageId,
    /// Recipient address
    pub recipient_hash: RecipientHash,
    /// Opaque ciphertext
    pub ciphertext: Vec<u8>,
    /// Untrusted sender hint
    pub sender_hint: Option<String>,
    /// Store time (informational)
    pub created_at: DateTime<Utc>,
    /// Expiry
    pub expires_at: DateTime<Utc>,
}

impl Message {
    fn from_new(id: MessageId, new: NewMessage) -> Self {
        Self {
            id,
            recipient_hash: new.recipient_hash,
            ciphertext: new.ciphertext,
            sender_hint: new.sender_hint,
            created_at: new.created_at,
            expires_at: new.expires_at,
        }
    }

    /// Whether the message is still deliverable at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Storage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Messages stored, including expired ones not yet purged
    pub message_count: usize,
    /// Distinct recipients with stored messages
    pub recipient_count: usize,
    /// Total ciphertext bytes
    pub total_bytes: u64,
    /// Expired messages awaiting the reaper
    pub expired_count: usize,
}

/// Transactional message store consumed by the relay
pub trait MessageStore: Send + Sync {
    /// Append a message and commit it durably
    fn append(&self, message: NewMessage) -> Result<MessageId>;

    /// Atomically select and delete all messages for `recipient` that are
    /// live at `now`, in arrival order
    fn take_live(&self, recipient: &RecipientHash, now: DateTime<Utc>) -> Result<Vec<Message>>;

    /// Physically delete messages expired at `now`
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Get storage stats
    fn stats(&self, now: DateTime<Utc>) -> Result<StorageStats>;
}

/// In-memory message store
///
/// Sharded by recipient: operations on different recipients never take the
/// same lock.
pub struct MemoryMessageStore {
    next_id: AtomicU64,
    queues: DashMap<RecipientHash, VecDeque<Message>>,
}

impl MemoryMessageStore {
    /// Create new in-memory storage
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            queues: DashMap::new(),
        }
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore for MemoryMessageStore {
    fn append(&self, message: NewMessage) -> Result<MessageId> {
        // Id is drawn under the recipient's entry guard so each queue stays
        // in id order
        let mut queue = self.queues.entry(message.recipient_hash).or_default();
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed));
        queue.push_back(Message::from_new(id, message));

        Ok(id)
    }

    fn take_live(&self, recipient: &RecipientHash, now: DateTime<Utc>) -> Result<Vec<Message>> {
        let Some(mut queue) = self.queues.get_mut(recipient) else {
            return Ok(Vec::new());
        };

        // Expired rows stay for the reaper
        let (live, expired): (Vec<_>, Vec<_>) = queue.drain(..).partition(|m| m.is_live(now));
        queue.extend(expired);
        let now_empty = queue.is_empty();
        drop(queue);

        if now_empty {
            self.queues.remove_if(recipient, |_, queue| queue.is_empty());
        }

        Ok(live)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;

        self.queues.retain(|_, queue| {
            let before = queue.len();
            queue.retain(|m| m.is_live(now));
            removed += before - queue.len();
            !queue.is_empty()
        });

        Ok(removed)
    }

    fn stats(&self, now: DateTime<Utc>) -> Result<StorageStats> {
        let mut stats = StorageStats::default();

        for entry in self.queues.iter() {
            stats.recipient_count += 1;
            for message in entry.value() {
                stats.message_count += 1;
                stats.total_bytes += message.ciphertext.len() as u64;
                if !message.is_live(now) {
                    stats.expired_count += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Sled-based persistent storage
///
/// Keys are `recipient_hash || id (u64 BE)`, so a prefix scan yields one
/// recipient's messages in arrival order.
pub struct SledMessageStore {
    db: sled::Db,
    messages: sled::Tree,
}

impl SledMessageStore {
    /// Open or create storage at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        let messages = db.open_tree("messages")?;
        Ok(Self { db, messages })
    }

    fn message_key(recipient: &RecipientHash, id: MessageId) -> [u8; 40] {
        let mut key = [0u8; 40];
        key[..32].copy_from_slice(recipient.as_bytes());
        key[32..].copy_from_slice(&id.0.to_be_bytes());
        key
    }
}

impl MessageStore for SledMessageStore {
    fn append(&self, message: NewMessage) -> Result<MessageId> {
        let id = MessageId(self.db.generate_id()?);
        let message = Message::from_new(id, message);
        let bytes = bincode::serialize(&message)?;

        self.messages
            .insert(Self::message_key(&message.recipient_hash, id), bytes)?;
        self.messages.flush()?;

        Ok(id)
    }

    fn take_live(&self, recipient: &RecipientHash, now: DateTime<Utc>) -> Result<Vec<Message>> {
        // Decode everything before deleting anything, so a corrupt record
        // fails the call without losing rows
        let mut candidates = Vec::new();
        for item in self.messages.scan_prefix(recipient.as_bytes()) {
            let (key, value) = item?;
            let message: Message = bincode::deserialize(&value)?;
            if message.is_live(now) {
                candidates.push((key, message));
            }
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Rows already removed by a concurrent fetch come back as None
        let taken = self
            .messages
            .transaction(|tx| {
                let mut taken = Vec::with_capacity(candidates.len());
                for (key, message) in &candidates {
                    if tx.remove(key.clone())?.is_some() {
                        taken.push(message.clone());
                    }
                }
                Ok(taken)
            })
            .map_err(|err: TransactionError<()>| match err {
                TransactionError::Storage(e) => RelayError::from(e),
                TransactionError::Abort(()) => {
                    RelayError::StorageUnavailable("transaction aborted".to_string())
                }
            })?;

        self.messages.flush()?;
        debug!("Took {} messages for {}", taken.len(), recipient.short());

        Ok(taken)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;

        for item in self.messages.iter() {
            let (key, value) = item?;
            let message: Message = bincode::deserialize(&value)?;
            if !message.is_live(now) && self.messages.remove(&key)?.is_some() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.messages.flush()?;
            info!("Purged {} expired messages", removed);
        }

        Ok(removed)
    }

    fn stats(&self, now: DateTime<Utc>) -> Result<StorageStats> {
        let mut stats = StorageStats::default();
        let mut recipients = HashSet::new();

        for item in self.messages.iter() {
            let (_, value) = item?;
            let message: Message = bincode::deserialize(&value)?;

            stats.message_count += 1;
            stats.total_bytes += message.ciphertext.len() as u64;
            if !message.is_live(now) {
                stats.expired_count += 1;
            }
            recipients.insert(message.recipient_hash);
        }

        stats.recipient_count = recipients.len();
        Ok(stats)
    }
}
