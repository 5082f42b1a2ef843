//! Diagnostic sender
//!
//! Pushes unsolicited `/d <n>` frames to a client at a fixed interval, on the
//! same connection the dispatcher replies on.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::{write_packet, DIAGNOSTIC_MARKER};

/// Handle to a running diagnostic thread. Stops the thread when dropped.
pub struct DiagnosticSender {
    /// Dropping the sender disconnects the channel, which stops the thread
    stop: Option<Sender<()>>,

    handle: Option<JoinHandle<u64>>,
}

impl DiagnosticSender {
    /// Start pushing diagnostics into `writer`
    ///
    /// The first frame goes out after `initial_delay`, then one every
    /// `interval` until stopped or a write fails.
    pub fn spawn<W>(
        writer: Arc<Mutex<W>>,
        initial_delay: Duration,
        interval: Duration,
        peer_addr: &str,
    ) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let peer = peer_addr.to_string();

        let handle = thread::Builder::new()
            .name(format!("servctl-diag-{}", peer_addr))
            .spawn(move || run(&writer, &stop_rx, initial_delay, interval, &peer))?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and return how many frames it sent
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        drop(self.stop.take());
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(sent)) => sent,
            Some(Err(_)) => {
                tracing::warn!("Diagnostic thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for DiagnosticSender {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<W: Write>(
    writer: &Mutex<W>,
    stop: &Receiver<()>,
    initial_delay: Duration,
    interval: Duration,
    peer: &str,
) -> u64 {
    let first = channel::after(initial_delay);
    select! {
        recv(stop) -> _ => return 0,
        recv(first) -> _ => {}
    }

    let ticker = channel::tick(interval);
    let mut sent: u64 = 0;

    loop {
        let content = format!("{} {}", DIAGNOSTIC_MARKER, sent + 1);
        if let Err(e) = write_packet(&mut *writer.lock(), content.as_bytes()) {
            tracing::debug!("Diagnostic push to {} failed: {}", peer, e);
            break;
        }
        sent += 1;
        tracing::trace!("Pushed diagnostic {:?} to {}", content, peer);

        select! {
            recv(stop) -> _ => break,
            recv(ticker) -> _ => {}
        }
    }

    tracing::debug!("Diagnostic sender for {} stopped after {} frames", peer, sent);
    sent
}
