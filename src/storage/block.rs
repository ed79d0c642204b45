//! Block frames
//!
//! Encoding of one block of elements into a checksummed spill file frame.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TierError};

use super::FRAME_HEADER_SIZE;

/// Location of one block frame inside the spill file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHandle {
    /// File offset of the frame header
    pub offset: u64,
    /// Payload length in bytes
    pub len: u32,
    /// CRC32 of the payload
    pub crc: u32,
}

impl BlockHandle {
    /// Bytes occupied on disk, header included
    pub fn frame_size(&self) -> u64 {
        FRAME_HEADER_SIZE + self.len as u64
    }
}

/// Serialize a block's elements into a frame payload
pub(crate) fn encode_block<T: Serialize>(items: &[T]) -> Result<Vec<u8>> {
    let payload = bincode::serialize(items)?;
    if payload.len() > u32::MAX as usize {
        return Err(TierError::Storage(format!(
            "Block payload too large: {} bytes",
            payload.len()
        )));
    }
    Ok(payload)
}

/// Deserialize a frame payload back into a block's elements
pub(crate) fn decode_block<T: DeserializeOwned>(payload: &[u8]) -> Result<Vec<T>> {
    Ok(bincode::deserialize(payload)?)
}

/// Build the frame header: [payload_len(4)][crc(4)]
pub(crate) fn frame_header(payload: &[u8]) -> ([u8; FRAME_HEADER_SIZE as usize], u32) {
    let crc = crc32fast::hash(payload);
    let mut header = [0u8; FRAME_HEADER_SIZE as usize];
    header[0..4].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    header[4..8].copy_from_slice(&crc.to_le_bytes());
    (header, crc)
}

/// Split a frame header into (payload_len, crc)
pub(crate) fn parse_frame_header(header: &[u8; FRAME_HEADER_SIZE as usize]) -> (u32, u32) {
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (len, crc)
}
