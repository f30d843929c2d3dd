//! # VaultChat Cryptographic Library
//!
//! Client-side cryptography for the VaultChat anonymous relay: per-peer
//! session keys derived from an X25519 exchange, and AES-256-GCM sealing of
//! message blobs before they are handed to the relay.
//!
//! ## Core Components
//!
//! - [`keys`]: Ephemeral X25519 key pairs and public key validation
//! - [`kdf`]: HKDF-SHA256 session key derivation and key fingerprints
//! - [`aead`]: Sealing and opening of `nonce || ciphertext || tag` blobs
//! - [`session`]: Per-peer session key cache

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod aead;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod session;

pub use aead::SessionKey;
pub use error::{CryptoError, Result};
pub use keys::EphemeralKeyPair;
pub use session::SessionKeyManager;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aead::{open, seal, SessionKey};
    pub use crate::error::{CryptoError, Result};
    pub use crate::keys::EphemeralKeyPair;
    pub use crate::session::SessionKeyManager;
}
