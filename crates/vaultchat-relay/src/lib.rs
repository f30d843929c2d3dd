//! # VaultChat Relay
//!
//! Store-and-forward relay for encrypted blobs. Senders deposit a blob
//! addressed by the SHA-256 hash of the recipient's public key; the
//! recipient later fetches and permanently removes everything pending.
//!
//! ## Features
//!
//! - **Hashed Addressing**: The relay never stores recipient identities
//! - **Read-Once Delivery**: A message is returned to at most one fetch
//! - **Time-Based Expiry**: Messages expire after 7 days, with jitter
//! - **Encrypted Blobs**: Ciphertext is never interpreted

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod identity;
pub mod relay;
pub mod server;
pub mod storage;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use identity::{IdentityLookup, MemoryIdentityDirectory};
pub use relay::MessageRelay;
pub use server::{spawn_reaper, RelayRequest, RelayResponse, RelayService, WireMessage};
pub use storage::{
    MemoryMessageStore, Message, MessageId, MessageStore, RecipientHash, SledMessageStore,
    StorageStats,
};

/// Default message time-to-live in seconds (7 days)
pub const DEFAULT_MESSAGE_TTL_SECS: u64 = 7 * 24 * 3600;

/// Default expiry jitter in minutes (applied as +/-)
pub const DEFAULT_TTL_JITTER_MINUTES: u32 = 60;

/// Maximum ciphertext size (1 MB)
pub const MAX_CIPHERTEXT_SIZE: usize = 1024 * 1024;
