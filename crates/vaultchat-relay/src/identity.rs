//! User identity directory
//!
//! Maps user identifiers to public keys. Identifiers are hashed before
//! storage so the directory never holds them in the clear.

use std::collections::HashMap;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;

/// Public key lookup used at the relay boundary
pub trait IdentityLookup: Send + Sync {
    /// Public key registered for `user_id`, if any
    fn lookup_public_key(&self, user_id: &str) -> Result<Option<Vec<u8>>>;
}

/// In-memory identity directory
#[derive(Default)]
pub struct MemoryIdentityDirectory {
    users: RwLock<HashMap<[u8; 32], Vec<u8>>>,
}

impl MemoryIdentityDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the public key for `user_id`
    ///
    /// Returns true if an existing key was replaced.
    pub fn register(&self, user_id: &str, public_key: Vec<u8>) -> bool {
        let replaced = self
            .users
            .write()
            .insert(hash_user_id(user_id), public_key)
            .is_some();

        debug!(replaced, "Registered identity");
        replaced
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl IdentityLookup for MemoryIdentityDirectory {
    fn lookup_public_key(&self, user_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.users.read().get(&hash_user_id(user_id)).cloned())
    }
}

fn hash_user_id(user_id: &str) -> [u8; 32] {
    Sha256::digest(user_id.as_bytes()).into()
}

/// Short hex prefix of the hashed user ID, for logs and error messages
pub fn user_tag(user_id: &str) -> String {
    hex::encode(&hash_user_id(user_id)[..4])
}
