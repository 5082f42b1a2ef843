//! Client command loop
//!
//! Foreground state machine driving the operator's operations. Each
//! operation sends one request frame and then blocks on the reply slot for
//! the matching reply; there is never more than one request in flight.
//!
//! ```text
//! Disconnected ──connect──▶ Connected ──authenticate──▶ Authenticated(Stopped)
//!       ▲                                                  │        ▲
//!       │                                            start │        │ stop
//!       │                                                  ▼        │
//!       └──────────────── exit (from any state) ◀──── Authenticated(Running)
//! ```

use std::io::{self, BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Precondition, Result, ServctlError};
use crate::protocol::{write_packet, Command, Reply};

use super::receiver::{spawn_receiver, ReceiverExit};
use super::{Console, ReplySlot};

/// State of the managed process, as last acknowledged by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Stopped,
    Running,
}

/// Client connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,

    /// Connected but the password has not been accepted yet
    Connected,

    Authenticated(ProcessStatus),
}

/// Everything that only exists while a connection is open
struct Link {
    /// Handle kept for shutting the socket down on exit
    stream: TcpStream,

    /// Request side of the socket (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Mailbox the receiver publishes replies into
    slot: Arc<ReplySlot>,

    /// Checked by the receiver between decodes
    shutdown: Arc<AtomicBool>,

    receiver: Option<JoinHandle<ReceiverExit>>,

    /// Peer address for logging
    peer_addr: String,
}

impl Link {
    /// Send one request and wait for its reply
    fn round_trip(&mut self, content: &str, timeout: Option<Duration>) -> Result<String> {
        if let Some(stale) = self.slot.take() {
            tracing::debug!("Discarding stale reply {:?}", stale);
        }
        write_packet(&mut self.writer, content.as_bytes())?;
        self.slot.wait_for_reply(timeout)
    }

    /// Stop the receiver and release the socket.
    ///
    /// Shutting the socket down unblocks a receiver parked in a read. The
    /// receiver is joined before the slot is closed.
    fn close(mut self) {
        self.shutdown.store(true, Ordering::Release);
        let _ = self.writer.flush();

        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!("Socket shutdown for {} failed: {}", self.peer_addr, e);
        }

        if let Some(handle) = self.receiver.take() {
            match handle.join() {
                Ok(exit) => tracing::debug!("Receiver for {} stopped: {:?}", self.peer_addr, exit),
                Err(_) => tracing::warn!("Receiver thread for {} panicked", self.peer_addr),
            }
        }

        self.slot.close();
    }
}

/// Operator-side session with one server
pub struct ClientSession {
    config: Config,
    console: Arc<dyn Console>,
    state: ClientState,
    link: Option<Link>,
}

impl ClientSession {
    /// Create a disconnected session
    pub fn new(config: Config, console: Arc<dyn Console>) -> Self {
        Self {
            config,
            console,
            state: ClientState::Disconnected,
            link: None,
        }
    }

    /// Current state. A connection whose receiver has already exited
    /// reports `Disconnected`.
    pub fn state(&self) -> ClientState {
        if self.link_lost() {
            ClientState::Disconnected
        } else {
            self.state
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some() && !self.link_lost()
    }

    /// Address this session connects to
    pub fn server_addr(&self) -> &str {
        &self.config.server_addr
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Open the connection and start the receiver thread
    ///
    /// On failure the session stays `Disconnected`.
    pub fn connect(&mut self) -> Result<()> {
        self.reap_lost_link();
        if self.link.is_some() {
            return Err(Precondition::AlreadyConnected.into());
        }

        let addr = self.resolve()?;
        let stream = self.open_stream(&addr)?;
        stream.set_nodelay(true)?;

        let peer_addr = addr.to_string();
        let read_stream = stream.try_clone()?;
        let write_stream = stream.try_clone()?;

        let slot = Arc::new(ReplySlot::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let receiver = spawn_receiver(
            BufReader::new(read_stream),
            Arc::clone(&slot),
            Arc::clone(&self.console),
            Arc::clone(&shutdown),
        )?;

        self.link = Some(Link {
            stream,
            writer: BufWriter::new(write_stream),
            slot,
            shutdown,
            receiver: Some(receiver),
            peer_addr,
        });
        self.state = ClientState::Connected;

        tracing::info!("Connected to {}", addr);
        Ok(())
    }

    /// Send the password and wait for the verdict
    pub fn authenticate(&mut self, password: &str) -> Result<()> {
        self.reap_lost_link();
        match self.state {
            ClientState::Disconnected => return Err(Precondition::NotConnected.into()),
            ClientState::Authenticated(_) => {
                return Err(Precondition::AlreadyAuthenticated.into())
            }
            ClientState::Connected => {}
        }

        tracing::debug!("Sending password ({} bytes)", password.len());
        let reply = self.request(password)?;

        if reply == Reply::Accepted {
            tracing::info!("Password accepted");
            self.state = ClientState::Authenticated(ProcessStatus::Stopped);
            Ok(())
        } else {
            tracing::info!("Password rejected: {}", reply);
            Err(ServctlError::AuthenticationRejected(reply))
        }
    }

    /// Ask the server to start the managed process
    pub fn start(&mut self) -> Result<()> {
        self.run_command(Command::Start)
    }

    /// Ask the server to stop the managed process
    pub fn stop(&mut self) -> Result<()> {
        self.run_command(Command::Stop)
    }

    /// Send a command whatever the locally known process status is.
    ///
    /// A fresh session cannot know whether the remote process is already
    /// running, so one-shot clients use this instead of [`start`](Self::start)
    /// and [`stop`](Self::stop). Still requires an accepted password.
    pub fn issue(&mut self, command: Command) -> Result<()> {
        self.reap_lost_link();
        match self.state {
            ClientState::Authenticated(_) => self.exchange(command),
            _ => Err(Precondition::NotAuthenticated.into()),
        }
    }

    /// Send arbitrary content and return whatever reply comes back.
    ///
    /// Does not change the session state.
    pub fn send_raw(&mut self, content: &str) -> Result<Reply> {
        self.reap_lost_link();
        self.request(content)
    }

    /// Tear the connection down. Safe to call from any state.
    pub fn exit(&mut self) {
        if let Some(link) = self.link.take() {
            tracing::info!("Disconnecting from {}", link.peer_addr);
            link.close();
        }
        self.state = ClientState::Disconnected;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn run_command(&mut self, command: Command) -> Result<()> {
        self.reap_lost_link();
        let from = match command {
            Command::Start => ProcessStatus::Stopped,
            Command::Stop => ProcessStatus::Running,
        };

        match self.state {
            ClientState::Authenticated(status) if status == from => {}
            ClientState::Authenticated(_) => {
                return Err(match command {
                    Command::Start => Precondition::AlreadyRunning,
                    Command::Stop => Precondition::AlreadyStopped,
                }
                .into())
            }
            _ => return Err(Precondition::NotAuthenticated.into()),
        }

        self.exchange(command)
    }

    /// Send a command token and apply its acknowledgement
    fn exchange(&mut self, command: Command) -> Result<()> {
        let to = match command {
            Command::Start => ProcessStatus::Running,
            Command::Stop => ProcessStatus::Stopped,
        };

        let reply = self.request(command.token())?;
        let expected = command.acknowledgement();

        if reply == expected {
            tracing::info!("Server acknowledged {:?}", command);
            self.state = ClientState::Authenticated(to);
            Ok(())
        } else {
            tracing::warn!("{:?} not acknowledged: {}", command, reply);
            Err(ServctlError::UnexpectedReply { expected, got: reply })
        }
    }

    fn link_lost(&self) -> bool {
        self.link.as_ref().map_or(false, |link| link.slot.is_closed())
    }

    /// Release a connection the receiver has already given up on
    fn reap_lost_link(&mut self) {
        if self.link_lost() {
            tracing::info!("Connection to server was lost, releasing it");
            self.exit();
        }
    }

    /// One request/reply exchange. A dead connection tears the session down.
    fn request(&mut self, content: &str) -> Result<Reply> {
        let timeout = self.config.reply_timeout();
        let link = self
            .link
            .as_mut()
            .ok_or(ServctlError::Precondition(Precondition::NotConnected))?;

        match link.round_trip(content, timeout) {
            Ok(text) => Ok(Reply::parse(&text)),
            Err(e @ (ServctlError::Io(_) | ServctlError::ConnectionClosed)) => {
                tracing::warn!("Connection failed during request: {}", e);
                self.exit();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn resolve(&self) -> Result<SocketAddr> {
        let target = &self.config.server_addr;
        let connect_failure = |source: io::Error| ServctlError::ConnectFailure {
            addr: target.clone(),
            source,
        };

        target
            .to_socket_addrs()
            .map_err(connect_failure)?
            .next()
            .ok_or_else(|| {
                connect_failure(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "address resolved to nothing",
                ))
            })
    }

    fn open_stream(&self, addr: &SocketAddr) -> Result<TcpStream> {
        let timeout = self.config.connect_timeout();
        let result = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(addr, timeout)
        };

        result.map_err(|source| {
            tracing::warn!("Connection to {} failed: {}", addr, source);
            ServctlError::ConnectFailure {
                addr: addr.to_string(),
                source,
            }
        })
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.exit();
    }
}
