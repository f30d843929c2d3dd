//! Key derivation for VaultChat session keys
//!
//! A session key is HKDF-SHA256 over the raw X25519 shared secret, with no
//! salt and a fixed, implementation-wide info label.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};

use crate::aead::{SessionKey, KEY_SIZE};
use crate::error::{CryptoError, Result};
use crate::keys::SharedSecret;

/// HKDF using SHA-256 for key derivation
pub type HkdfSha256 = Hkdf<Sha256>;

/// Domain separation strings for key derivation contexts
pub mod domain {
    /// Session key derivation from the X25519 shared secret
    pub const SESSION_KEY: &[u8] = b"vault-chat-v1";
}

/// Derive the 32-byte session key from a DH shared secret
pub fn derive_session_key(shared: &SharedSecret) -> Result<SessionKey> {
    let hkdf = HkdfSha256::new(None, shared.as_bytes());

    let mut output = [0u8; KEY_SIZE];
    hkdf.expand(domain::SESSION_KEY, &mut output)
        .map_err(|_| CryptoError::KeyDerivation("HKDF expansion failed".to_string()))?;

    Ok(SessionKey::from_bytes(output))
}

/// SHA-256 fingerprint of a public key
pub fn fingerprint(public_key: &[u8]) -> [u8; 32] {
    Sha256::digest(public_key).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::EphemeralKeyPair;

    #[test]
    fn test_session_key_is_deterministic() {
        let alice = EphemeralKeyPair::from_secret_bytes([1u8; 32]);
        let bob = EphemeralKeyPair::from_secret_bytes([2u8; 32]);

        let shared = alice.diffie_hellman(&bob.public_key_bytes()).unwrap();
        let key1 = derive_session_key(&shared).unwrap();
        let key2 = derive_session_key(&shared).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
        // The key must not be the raw shared secret
        assert_ne!(key1.as_bytes(), shared.as_bytes());
    }

    #[test]
    fn test_fingerprint() {
        let a = fingerprint(&[1u8; 32]);
        let b = fingerprint(&[2u8; 32]);

        assert_ne!(a, b);
        assert_eq!(a, fingerprint(&[1u8; 32]));
        assert_eq!(
            hex::encode(fingerprint(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
