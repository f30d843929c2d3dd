//! # VaultChat Anonymity
//!
//! Metadata obfuscation for VaultChat clients. Nothing here touches key
//! material: the layer works on already-sealed blobs.
//!
//! ## Features
//!
//! - **Fixed-Size Envelopes**: Every sealed blob is padded to the same length
//! - **Timing Randomization**: Uniform random delay before each send
//! - **Proxy Routing**: Configuration for routing relay traffic through Tor

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod obfuscation;

pub use config::{AnonymityConfig, ObfuscationConfig, ProxyConfig};
pub use envelope::{PayloadShape, DEFAULT_ENVELOPE_SIZE, MAX_ENVELOPE_SIZE};
pub use error::{AnonymityError, Result};
pub use obfuscation::{TrafficObfuscator, TransportType};
