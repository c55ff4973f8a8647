//! Wire framing for the broadcast channel
//!
//! # Protocol
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ Payload (variable)       │
//! │ Big-endian u32   │ UTF-8 JSON document      │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! - **Maximum payload**: 1MB. A larger length prefix means the peer is not
//!   speaking this protocol and the connection is dropped.
//! - **Payload**: any JSON value. Telemetry publishers send objects, but
//!   subscribers accept whatever arrives so discovery can describe foreign
//!   publishers too.
//! - **Malformed payload**: the frame is discarded and logged by the
//!   subscriber; the connection stays open.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Size of the length prefix
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest accepted payload (1MB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Serialize `message` into `buffer` as one length-prefixed frame
///
/// `buffer` is cleared first so a single allocation can be reused across
/// messages.
pub fn encode_frame<T: Serialize>(message: &T, buffer: &mut Vec<u8>) -> Result<()> {
    buffer.clear();
    buffer.extend_from_slice(&[0u8; LENGTH_PREFIX_SIZE]);
    serde_json::to_writer(&mut *buffer, message)?;

    let payload_len = buffer.len() - LENGTH_PREFIX_SIZE;
    if payload_len > MAX_MESSAGE_SIZE {
        return Err(Error::FrameTooLarge(payload_len));
    }
    buffer[..LENGTH_PREFIX_SIZE].copy_from_slice(&(payload_len as u32).to_be_bytes());
    Ok(())
}

/// Total size of the frame at the front of `buffer`, prefix included
///
/// Returns `Ok(None)` until the whole frame has arrived. A length prefix
/// above [`MAX_MESSAGE_SIZE`] is an error: the peer is not speaking this
/// protocol and nothing after it can be trusted.
pub fn frame_length(buffer: &[u8]) -> Result<Option<usize>> {
    let Some(prefix) = buffer.get(..LENGTH_PREFIX_SIZE) else {
        return Ok(None);
    };
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(Error::FrameTooLarge(len));
    }

    let end = LENGTH_PREFIX_SIZE + len;
    Ok((buffer.len() >= end).then_some(end))
}

/// Parse the JSON payload of one complete frame (length prefix included)
pub fn decode_payload(frame: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(&frame[LENGTH_PREFIX_SIZE..])?)
}
