//! Key types for the VaultChat key exchange
//!
//! Each client process holds one ephemeral X25519 key pair. Peer public keys
//! arrive as raw bytes from the identity directory and are validated here
//! before any shared secret is used.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret as X25519StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, Result};

/// Size of X25519 public keys in bytes
pub const X25519_PUBLIC_KEY_SIZE: usize = 32;

/// A X25519 key pair for Diffie-Hellman key exchange
pub struct EphemeralKeyPair {
    /// The secret key (zeroized on drop by x25519-dalek)
    secret: X25519StaticSecret,
    /// The public key
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new random ephemeral key pair
    pub fn generate() -> Self {
        let secret = X25519StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Create from existing secret bytes
    ///
    /// # Security
    /// The input bytes should come from a secure random source
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = X25519StaticSecret::from(bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public key bytes
    pub fn public_key_bytes(&self) -> [u8; X25519_PUBLIC_KEY_SIZE] {
        *self.public.as_bytes()
    }

    /// Perform X25519 DH with a peer's raw public key bytes
    ///
    /// Rejects keys of the wrong length and low-order points whose shared
    /// secret would not depend on our secret.
    pub fn diffie_hellman(&self, their_public: &[u8]) -> Result<SharedSecret> {
        let their_key = parse_public_key(their_public)?;
        let shared = self.secret.diffie_hellman(&their_key);

        if !shared.was_contributory() {
            return Err(CryptoError::InvalidKey("low-order point".to_string()));
        }

        Ok(SharedSecret(*shared.as_bytes()))
    }
}

/// A shared secret derived from Diffie-Hellman key exchange
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Get the secret bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Parse raw bytes as an X25519 public key
pub fn parse_public_key(bytes: &[u8]) -> Result<X25519PublicKey> {
    let bytes: [u8; X25519_PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "expected {} bytes, got {}",
            X25519_PUBLIC_KEY_SIZE,
            bytes.len()
        ))
    })?;
    Ok(X25519PublicKey::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_keypair_generation() {
        let kp1 = EphemeralKeyPair::generate();
        let kp2 = EphemeralKeyPair::generate();

        assert_ne!(kp1.public_key_bytes(), kp2.public_key_bytes());
    }

    #[test]
    fn test_from_secret_bytes_is_deterministic() {
        let kp1 = EphemeralKeyPair::from_secret_bytes([7u8; 32]);
        let kp2 = EphemeralKeyPair::from_secret_bytes([7u8; 32]);

        assert_eq!(kp1.public_key_bytes(), kp2.public_key_bytes());
    }

    #[test]
    fn test_diffie_hellman_exchange() {
        let alice = EphemeralKeyPair::generate();
        let bob = EphemeralKeyPair::generate();

        let alice_shared = alice.diffie_hellman(&bob.public_key_bytes()).unwrap();
        let bob_shared = bob.diffie_hellman(&alice.public_key_bytes()).unwrap();

        assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let alice = EphemeralKeyPair::generate();

        for len in [0, 31, 33, 64] {
            let result = alice.diffie_hellman(&vec![9u8; len]);
            assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
        }
    }

    #[test]
    fn test_low_order_point_rejected() {
        let alice = EphemeralKeyPair::generate();

        // The all-zero point has order 1.
        let result = alice.diffie_hellman(&[0u8; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
    }
}
