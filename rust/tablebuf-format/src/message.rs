//! Checksummed framing for persisting finished buffers.
//!
//! A sealed message is `[u32 payload_len][payload][u32 checksum]`, all
//! little-endian, where the checksum covers the payload only.

use std::io::Write;

use tablebuf_common::{Result, error::Error, error::ErrorKind, verify_arg};

use crate::{builder::FinishedBuffer, reader::read_scalar_at};

pub const MESSAGE_LEN_SIZE: usize = 4;
pub const CHECKSUM_SIZE: usize = 4;

/// Computes the folded xxh3-64 checksum of `buf`.
pub fn compute(buf: &[u8]) -> u32 {
    let h = xxhash_rust::xxh3::xxh3_64(buf);
    (h as u32) ^ ((h >> 32) as u32)
}

/// Compares the checksum of `buf` with `checksum`.
///
/// # Errors
///
/// Returns a checksum-mismatch error naming `name` if they differ.
pub fn validate_buffer(buf: &[u8], checksum: u32, name: Option<&str>) -> Result<()> {
    if compute(buf) == checksum {
        Ok(())
    } else {
        Err(ErrorKind::ChecksumMismatch {
            element: name.unwrap_or_default().to_string(),
        }
        .into())
    }
}

/// Validates a sealed message and returns its payload.
///
/// # Errors
///
/// Returns an invalid-argument error if the message is shorter than its
/// framing or its declared length, and a checksum-mismatch error if the
/// payload does not match the trailing checksum.
pub fn open_message(message: &[u8]) -> Result<&[u8]> {
    verify_arg!(message, message.len() >= MESSAGE_LEN_SIZE + CHECKSUM_SIZE);
    let size = read_scalar_at::<u32>(message, 0)? as usize;
    verify_arg!(
        size,
        size <= message.len() - MESSAGE_LEN_SIZE - CHECKSUM_SIZE
    );
    let payload = &message[MESSAGE_LEN_SIZE..MESSAGE_LEN_SIZE + size];
    let checksum = read_scalar_at::<u32>(message, MESSAGE_LEN_SIZE + size)?;
    validate_buffer(payload, checksum, Some("message"))?;
    Ok(payload)
}

/// Writes `payload` as a sealed message.
pub fn write_message<W: Write>(payload: &[u8], writer: &mut W) -> Result<()> {
    let size = u32::try_from(payload.len())
        .map_err(|_| Error::capacity_exceeded(payload.len(), u32::MAX as usize))?;
    let checksum = compute(payload);
    let write = |writer: &mut W| -> std::io::Result<()> {
        writer.write_all(&size.to_le_bytes())?;
        writer.write_all(payload)?;
        writer.write_all(&checksum.to_le_bytes())
    };
    write(writer).map_err(|e| Error::io("write_message", e))
}

/// Returns `payload` framed as a sealed message.
pub fn seal(payload: &[u8]) -> Result<Vec<u8>> {
    let mut message = Vec::with_capacity(MESSAGE_LEN_SIZE + payload.len() + CHECKSUM_SIZE);
    write_message(payload, &mut message)?;
    Ok(message)
}

impl FinishedBuffer {
    /// Frames the finished bytes as a sealed message.
    pub fn seal(&self) -> Result<Vec<u8>> {
        seal(self.data())
    }
}
