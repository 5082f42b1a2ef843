//! Packet definition
//!
//! The in-memory form of one decoded frame.

use std::borrow::Cow;

use bytes::Bytes;

use super::{CURRENT_VERSION, MAX_MESSAGE_LENGTH};

/// A decoded frame
///
/// `version == 0` is the sentinel: no valid frame could be decoded (peer
/// closed, short read or I/O error). It never occurs on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Protocol version tag
    pub version: u8,

    /// Declared content length, as read from the header
    pub content_length: u16,

    /// Raw content bytes, exactly `content_length` of them
    pub content: Bytes,
}

impl Packet {
    /// The "no valid packet" value
    pub fn sentinel() -> Self {
        Self {
            version: 0,
            content_length: 0,
            content: Bytes::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.version == 0
    }

    /// Version matches, length is in range and agrees with the content
    pub fn is_well_formed(&self) -> bool {
        self.version == CURRENT_VERSION
            && self.content.len() <= MAX_MESSAGE_LENGTH
            && self.content_length as usize == self.content.len()
    }

    /// Content as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
