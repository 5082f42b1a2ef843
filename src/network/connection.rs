//! Connection Handler
//!
//! Handles individual client connections: one dispatcher loop on the
//! connection's thread plus a diagnostic sender sharing the write side.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, ServctlError};
use crate::protocol::{try_read_packet, write_packet, Reply};

use super::diagnostics::DiagnosticSender;
use super::session::{ServerSession, SessionPhase};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer, shared with the diagnostic sender
    writer: Arc<Mutex<BufWriter<TcpStream>>>,

    /// Dispatcher state for this client
    session: ServerSession,

    diagnostic_initial_delay: Duration,
    diagnostic_interval: Duration,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn new(stream: TcpStream, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut connection = Self {
            reader: BufReader::new(read_stream),
            writer: Arc::new(Mutex::new(BufWriter::new(write_stream))),
            session: ServerSession::new(config.secret.clone()),
            diagnostic_initial_delay: config.diagnostic_initial_delay(),
            diagnostic_interval: config.diagnostic_interval(),
            peer_addr,
        };
        connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;

        Ok(connection)
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .lock()
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and sends one reply per frame. Diagnostics
    /// start once the password frame has been answered and stop when this
    /// returns.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut diagnostics: Option<DiagnosticSender> = None;
        let result = self.dispatch_loop(&mut diagnostics);

        if let Some(sender) = diagnostics {
            let sent = sender.stop();
            tracing::debug!("Sent {} diagnostics to {}", sent, self.peer_addr);
        }
        let _ = self.reader.get_ref().shutdown(Shutdown::Both);

        result
    }

    fn dispatch_loop(&mut self, diagnostics: &mut Option<DiagnosticSender>) -> Result<()> {
        loop {
            // Read next frame
            let packet = match try_read_packet(&mut self.reader) {
                Ok(packet) => packet,
                Err(ServctlError::ConnectionClosed) => {
                    // Client disconnected gracefully
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(ServctlError::Io(ref e))
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection with {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(ServctlError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let content = packet.text();
            let awaiting_password = self.session.phase() == SessionPhase::AwaitingPassword;

            if awaiting_password {
                tracing::trace!("Received password from {} ({} bytes)", self.peer_addr, content.len());
            } else {
                tracing::trace!("Received frame from {}: {:?}", self.peer_addr, content);
            }

            let reply = self.session.handle(&content);
            tracing::debug!("Replying {} to {}", reply, self.peer_addr);

            if let Err(e) = self.send_reply(&reply) {
                // If the client disconnected before we could send the reply,
                // log and exit gracefully rather than treating it as a server error.
                if let ServctlError::Io(ref io_err) = e {
                    match io_err.kind() {
                        ErrorKind::ConnectionAborted
                        | ErrorKind::ConnectionReset
                        | ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "Client {} disconnected before reply could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if awaiting_password && diagnostics.is_none() {
                *diagnostics = Some(DiagnosticSender::spawn(
                    Arc::clone(&self.writer),
                    self.diagnostic_initial_delay,
                    self.diagnostic_interval,
                    &self.peer_addr,
                )?);
            }
        }
    }

    /// Send a reply to the client
    fn send_reply(&mut self, reply: &Reply) -> Result<()> {
        let mut writer = self.writer.lock();
        write_packet(&mut *writer, reply.as_str().as_bytes())
    }
}
