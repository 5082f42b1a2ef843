//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. Nothing else in the
//! crate touches the frame layout directly.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────┬────────────────┬─────────────────────────────┐
//! │ Version (1) │ Length (2, BE) │          Content            │
//! └─────────────┴────────────────┴─────────────────────────────┘
//! ```
//!
//! The declared length is the only way the end of the content is found;
//! content is never scanned for a terminator.

use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, ServctlError};
use super::{Packet, CURRENT_VERSION, HEADER_SIZE, MAX_MESSAGE_LENGTH};

// =============================================================================
// Buffer Encoding/Decoding
// =============================================================================

/// Encode content into one contiguous frame
///
/// Format: version (1) + content_len (2, big-endian) + content
pub fn encode_packet(content: &[u8]) -> Result<Bytes> {
    if content.len() > MAX_MESSAGE_LENGTH {
        return Err(ServctlError::FrameTooLarge {
            len: content.len(),
            max: MAX_MESSAGE_LENGTH,
        });
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + content.len());
    frame.put_u8(CURRENT_VERSION);
    frame.put_u16(content.len() as u16);
    frame.put_slice(content);

    Ok(frame.freeze())
}

/// Decode a single frame from the start of a byte buffer
pub fn decode_packet(bytes: &[u8]) -> Result<Packet> {
    let mut cursor = bytes;
    try_read_packet(&mut cursor)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until the frame is complete. A short read at any of the three
/// stages, a wrong version or an oversized length is an error; no partially
/// filled packet is ever returned.
pub fn try_read_packet<R: Read>(reader: &mut R) -> Result<Packet> {
    // EOF before the first byte is a clean close, not a truncated frame
    let mut version = [0u8; 1];
    match reader.read_exact(&mut version) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            return Err(ServctlError::ConnectionClosed)
        }
        Err(e) => return Err(ServctlError::Io(e)),
    }
    let version = version[0];

    if version != CURRENT_VERSION {
        return Err(ServctlError::FrameDecode(format!(
            "unsupported version {} (expected {})",
            version, CURRENT_VERSION
        )));
    }

    let mut length = [0u8; 2];
    read_field(reader, &mut length, "length")?;
    let content_length = u16::from_be_bytes(length);

    if content_length as usize > MAX_MESSAGE_LENGTH {
        return Err(ServctlError::FrameDecode(format!(
            "content too large: {} bytes (max {})",
            content_length, MAX_MESSAGE_LENGTH
        )));
    }

    let mut content = vec![0u8; content_length as usize];
    read_field(reader, &mut content, "content")?;

    Ok(Packet {
        version,
        content_length,
        content: Bytes::from(content),
    })
}

/// Read one frame, yielding the sentinel packet on any failure
pub fn read_packet<R: Read>(reader: &mut R) -> Packet {
    match try_read_packet(reader) {
        Ok(packet) => packet,
        Err(e) => {
            tracing::debug!("No valid frame decoded: {}", e);
            Packet::sentinel()
        }
    }
}

/// Encode content and write it to a stream as one frame
pub fn write_packet<W: Write>(writer: &mut W, content: &[u8]) -> Result<()> {
    let frame = encode_packet(content)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Fill `buf` completely, mapping a clean EOF onto a decode failure
fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            ServctlError::FrameDecode(format!("stream ended while reading {}", field))
        }
        _ => ServctlError::Io(e),
    })
}
