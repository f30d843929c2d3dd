//! # VaultChat Client
//!
//! End-user transport for the VaultChat relay. Combines per-peer session
//! keys, AEAD sealing, fixed-size envelopes and randomized send delays on
//! top of a [`RelayConnector`].
//!
//! ## Features
//!
//! - **Sealed Messages**: Plaintext never leaves the client unencrypted
//! - **No Sender Identity**: Messages are stored without any sender field
//! - **Batch Isolation**: One corrupt message never hides its siblings
//! - **Cancellable Sends**: Dropping a send before the relay call sends nothing

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod connector;
pub mod error;

pub use client::{ReceivedMessage, TransportClient};
pub use connector::RelayConnector;
pub use error::{ClientError, ErrorKind, Result};
