//! Fixed-size envelope framing
//!
//! Layout: `[length: u32 BE][payload][random padding]`, always exactly
//! `total_size` bytes on the wire so an observer cannot infer message length.

use rand::RngCore;

use crate::error::{AnonymityError, Result};

/// Default envelope size (64 KB)
pub const DEFAULT_ENVELOPE_SIZE: usize = 64 * 1024;

/// Largest configurable envelope (16 MB)
pub const MAX_ENVELOPE_SIZE: usize = 16 * 1024 * 1024;

/// Size of the big-endian length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload that fits in an envelope of `total_size` bytes
pub fn capacity(total_size: usize) -> usize {
    total_size.saturating_sub(LENGTH_PREFIX_SIZE)
}

/// Pad `payload` into an envelope of exactly `total_size` bytes
pub fn encode(payload: &[u8], total_size: usize) -> Result<Vec<u8>> {
    let capacity = capacity(total_size);
    let oversize = AnonymityError::Oversize {
        size: payload.len(),
        capacity,
    };
    if total_size < LENGTH_PREFIX_SIZE || payload.len() > capacity {
        return Err(oversize);
    }
    let length = u32::try_from(payload.len()).map_err(|_| oversize)?;

    let mut envelope = Vec::with_capacity(total_size);
    envelope.extend_from_slice(&length.to_be_bytes());
    envelope.extend_from_slice(payload);

    let mut padding = vec![0u8; total_size - LENGTH_PREFIX_SIZE - payload.len()];
    rand::thread_rng().fill_bytes(&mut padding);
    envelope.extend_from_slice(&padding);

    Ok(envelope)
}

/// Extract the payload from an envelope, ignoring the padding
pub fn decode(envelope: &[u8]) -> Result<Vec<u8>> {
    let available = envelope.len().saturating_sub(LENGTH_PREFIX_SIZE);
    let prefix: [u8; LENGTH_PREFIX_SIZE] = envelope
        .get(..LENGTH_PREFIX_SIZE)
        .and_then(|p| p.try_into().ok())
        .ok_or(AnonymityError::Truncated {
            declared: 0,
            available,
        })?;

    let declared = u32::from_be_bytes(prefix) as usize;
    if declared > available {
        return Err(AnonymityError::Truncated {
            declared,
            available,
        });
    }

    Ok(envelope[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + declared].to_vec())
}

/// Shape of a blob received from the relay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadShape<'a> {
    /// A padded envelope of the configured fixed size
    FixedEnvelope(&'a [u8]),
    /// An unpadded blob, passed through unchanged
    RawBlob(&'a [u8]),
}

impl<'a> PayloadShape<'a> {
    /// Classify `blob` by comparing its length to the fixed envelope size
    pub fn classify(blob: &'a [u8], envelope_size: usize) -> Self {
        if blob.len() == envelope_size {
            PayloadShape::FixedEnvelope(blob)
        } else {
            PayloadShape::RawBlob(blob)
        }
    }

    /// Resolve to the inner payload
    pub fn into_payload(self) -> Result<Vec<u8>> {
        match self {
            PayloadShape::FixedEnvelope(envelope) => decode(envelope),
            PayloadShape::RawBlob(blob) => Ok(blob.to_vec()),
        }
    }
}
