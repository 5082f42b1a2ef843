//! Protocol Module
//!
//! Defines the wire protocol between the control client and the server.
//!
//! ## Frame Format (V1)
//!
//! ```text
//! ┌─────────────┬────────────────┬─────────────────────────────┐
//! │ Version (1) │ Length (2, BE) │     Content (Length bytes)  │
//! └─────────────┴────────────────┴─────────────────────────────┘
//! ```
//!
//! Content is UTF-8 text and is not null-terminated on the wire.
//!
//! ### Commands (client → server)
//! - `/s`: start the managed process
//! - `/q`: stop the managed process
//! - anything else before authentication: a password attempt
//!
//! ### Replies (server → client)
//! - `ACCEPTED` / `DENIED`: password verdict
//! - `STARTED` / `STOPPED`: command acknowledgements
//! - `UNKNOWN COMMAND`: unrecognised command
//! - any text containing `/d`: unsolicited diagnostic push

mod packet;
mod command;
mod reply;
mod codec;

pub use packet::Packet;
pub use command::Command;
pub use reply::{Inbound, Reply, trim_line_ending};
pub use codec::{encode_packet, decode_packet, read_packet, try_read_packet, write_packet};

/// Protocol version carried in every frame
pub const CURRENT_VERSION: u8 = 1;

/// Largest content a frame may carry, in bytes
pub const MAX_MESSAGE_LENGTH: usize = 1024;

/// Header size: 1 byte version + 2 bytes length
pub const HEADER_SIZE: usize = 3;

/// Substring that marks a frame as an unsolicited diagnostic push
pub const DIAGNOSTIC_MARKER: &str = "/d";
