//! Per-peer session key management
//!
//! A [`SessionKeyManager`] owns the local ephemeral key pair and a cache of
//! derived session keys. Entries are bound to the fingerprint of the peer
//! public key they were derived from, so a peer that rotates its key gets a
//! fresh derivation instead of a stale cached key.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::aead::SessionKey;
use crate::error::Result;
use crate::kdf;
use crate::keys::EphemeralKeyPair;

/// Cached key for a single peer
struct CachedSession {
    /// Fingerprint of the peer public key used for derivation
    peer_fingerprint: [u8; 32],
    /// The derived key
    key: SessionKey,
}

/// Derives and caches a symmetric key per peer
pub struct SessionKeyManager {
    keypair: EphemeralKeyPair,
    sessions: RwLock<HashMap<String, CachedSession>>,
}

impl SessionKeyManager {
    /// Create a manager with a freshly generated ephemeral key pair
    pub fn new() -> Self {
        Self::with_keypair(EphemeralKeyPair::generate())
    }

    /// Create a manager around an existing key pair
    pub fn with_keypair(keypair: EphemeralKeyPair) -> Self {
        Self {
            keypair,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Our public key, to be published through the identity directory
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.keypair.public_key_bytes()
    }

    /// Get or derive the session key for `peer_id`.
    ///
    /// A cached key is returned without recomputation as long as
    /// `peer_public_key` matches the key it was derived from.
    pub fn establish(&self, peer_id: &str, peer_public_key: &[u8]) -> Result<SessionKey> {
        let peer_fingerprint = kdf::fingerprint(peer_public_key);

        if let Some(cached) = self.sessions.read().get(peer_id) {
            if cached.peer_fingerprint == peer_fingerprint {
                return Ok(cached.key.clone());
            }
        }

        let shared = self.keypair.diffie_hellman(peer_public_key)?;
        let key = kdf::derive_session_key(&shared)?;

        let previous = self.sessions.write().insert(
            peer_id.to_string(),
            CachedSession {
                peer_fingerprint,
                key: key.clone(),
            },
        );

        match previous {
            Some(prev) if prev.peer_fingerprint != peer_fingerprint => {
                info!("Peer {} rotated its public key, session re-derived", peer_id);
            }
            Some(_) => {}
            None => debug!("Established session with {}", peer_id),
        }

        Ok(key)
    }

    /// Drop the cached key for `peer_id`.
    ///
    /// Returns true if a session was cached.
    pub fn invalidate(&self, peer_id: &str) -> bool {
        self.sessions.write().remove(peer_id).is_some()
    }

    /// Whether a session is cached for `peer_id`
    pub fn has_session(&self, peer_id: &str) -> bool {
        self.sessions.read().contains_key(peer_id)
    }

    /// Number of cached sessions
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Peer IDs with a cached session, sorted
    pub fn cached_peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.sessions.read().keys().cloned().collect();
        peers.sort();
        peers
    }
}

impl Default for SessionKeyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aead::{open, seal};
    use crate::error::CryptoError;
    use std::sync::Arc;

    #[test]
    fn test_key_symmetry() {
        let alice = SessionKeyManager::new();
        let bob = SessionKeyManager::new();

        let alice_key = alice.establish("bob", &bob.public_key_bytes()).unwrap();
        let bob_key = bob.establish("alice", &alice.public_key_bytes()).unwrap();

        assert_eq!(alice_key.as_bytes(), bob_key.as_bytes());
    }

    #[test]
    fn test_symmetric_keys_interoperate() {
        let alice = SessionKeyManager::new();
        let bob = SessionKeyManager::new();

        let alice_key = alice.establish("bob", &bob.public_key_bytes()).unwrap();
        let bob_key = bob.establish("alice", &alice.public_key_bytes()).unwrap();

        let sealed = seal(&alice_key, b"hi bob").unwrap();
        assert_eq!(open(&bob_key, &sealed).unwrap(), b"hi bob");
    }

    #[test]
    fn test_distinct_peers_get_distinct_keys() {
        let alice = SessionKeyManager::new();
        let bob = SessionKeyManager::new();
        let carol = SessionKeyManager::new();

        let with_bob = alice.establish("bob", &bob.public_key_bytes()).unwrap();
        let with_carol = alice.establish("carol", &carol.public_key_bytes()).unwrap();

        assert_ne!(with_bob.as_bytes(), with_carol.as_bytes());
        assert_eq!(alice.session_count(), 2);
    }

    #[test]
    fn test_cached_key_reused() {
        let alice = SessionKeyManager::new();
        let bob = SessionKeyManager::new();

        let first = alice.establish("bob", &bob.public_key_bytes()).unwrap();
        let second = alice.establish("bob", &bob.public_key_bytes()).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(alice.session_count(), 1);
    }

    #[test]
    fn test_rotated_peer_key_rederives() {
        let alice = SessionKeyManager::new();
        let bob_old = SessionKeyManager::new();
        let bob_new = SessionKeyManager::new();

        let old_key = alice.establish("bob", &bob_old.public_key_bytes()).unwrap();
        let new_key = alice.establish("bob", &bob_new.public_key_bytes()).unwrap();

        assert_ne!(old_key.as_bytes(), new_key.as_bytes());
        assert_eq!(alice.session_count(), 1);

        let bob_side = bob_new.establish("alice", &alice.public_key_bytes()).unwrap();
        assert_eq!(new_key.as_bytes(), bob_side.as_bytes());
    }

    #[test]
    fn test_invalid_key_not_cached() {
        let alice = SessionKeyManager::new();

        let result = alice.establish("mallory", &[1, 2, 3]);
        assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
        assert!(!alice.has_session("mallory"));
    }

    #[test]
    fn test_invalidate() {
        let alice = SessionKeyManager::new();
        let bob = SessionKeyManager::new();

        alice.establish("bob", &bob.public_key_bytes()).unwrap();
        assert!(alice.has_session("bob"));

        assert!(alice.invalidate("bob"));
        assert!(!alice.has_session("bob"));
        assert!(!alice.invalidate("bob"));
    }

    #[test]
    fn test_cached_peers() {
        let alice = SessionKeyManager::new();
        assert!(alice.cached_peers().is_empty());

        let bob = SessionKeyManager::new();
        let carol = SessionKeyManager::new();
        alice.establish("carol", &carol.public_key_bytes()).unwrap();
        alice.establish("bob", &bob.public_key_bytes()).unwrap();
        assert_eq!(alice.cached_peers(), vec!["bob".to_string(), "carol".to_string()]);

        alice.invalidate("carol");
        assert_eq!(alice.cached_peers(), vec!["bob".to_string()]);
    }

    #[test]
    fn test_concurrent_establish() {
        let alice = Arc::new(SessionKeyManager::new());
        let bob = SessionKeyManager::new();
        let bob_public = bob.public_key_bytes();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let alice = Arc::clone(&alice);
                std::thread::spawn(move || *alice.establish("bob", &bob_public).unwrap().as_bytes())
            })
            .collect();

        let keys: Vec<[u8; 32]> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(alice.session_count(), 1);
    }
}
