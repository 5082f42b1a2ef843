//! Receiver loop
//!
//! Background thread that decodes every inbound frame for the lifetime of a
//! connection and routes it: correlated replies go to the [`ReplySlot`],
//! diagnostic pushes go straight to the [`Console`].

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::Result;
use crate::protocol::{read_packet, Inbound};

use super::{Console, ReplySlot};

/// Why the receiver loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverExit {
    /// The shutdown flag was set by the command loop
    Shutdown,

    /// Decoding failed: peer closed, short read or I/O error
    ConnectionLost,
}

/// Spawn the receiver loop on its own thread
pub fn spawn_receiver<R>(
    reader: R,
    slot: Arc<ReplySlot>,
    console: Arc<dyn Console>,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<ReceiverExit>>
where
    R: Read + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("servctl-receiver".to_string())
        .spawn(move || run_receiver(reader, &slot, console.as_ref(), &shutdown))?;
    Ok(handle)
}

/// Decode and route frames until the stream fails or shutdown is requested.
///
/// The slot is always closed on return so a command waiting for a reply is
/// released instead of blocking forever.
pub fn run_receiver<R: Read>(
    mut reader: R,
    slot: &ReplySlot,
    console: &dyn Console,
    shutdown: &AtomicBool,
) -> ReceiverExit {
    let mut frames: u64 = 0;

    let exit = loop {
        if shutdown.load(Ordering::Acquire) {
            break ReceiverExit::Shutdown;
        }

        let packet = read_packet(&mut reader);
        if packet.is_sentinel() {
            if shutdown.load(Ordering::Acquire) {
                break ReceiverExit::Shutdown;
            }
            tracing::warn!("Connection to server lost after {} frames", frames);
            console.notice("Connection to server lost.");
            break ReceiverExit::ConnectionLost;
        }

        frames += 1;
        let text = packet.text();
        tracing::debug!(
            version = packet.version,
            length = packet.content_length,
            "Received frame: {:?}",
            text
        );

        match Inbound::classify(&text) {
            Inbound::Reply(reply) => {
                tracing::trace!("Routing reply {} to waiting command", reply);
                slot.publish(reply.as_str());
            }
            Inbound::Diagnostic(message) => console.diagnostic(&message),
        }
    };

    slot.close();
    tracing::debug!("Receiver loop exited: {:?}", exit);
    exit
}
