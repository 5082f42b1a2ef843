//! Server session
//!
//! Per-connection dispatcher state. Maps each inbound frame's content to
//! exactly one reply; no I/O happens here.

use crate::protocol::{trim_line_ending, Command, Reply};

/// Dispatcher phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The next frame is the password
    AwaitingPassword,

    /// Frames are commands
    Dispatching,
}

/// State of one client connection
#[derive(Debug)]
pub struct ServerSession {
    secret: String,
    phase: SessionPhase,
    authenticated: bool,
    running: bool,
}

impl ServerSession {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            phase: SessionPhase::AwaitingPassword,
            authenticated: false,
            running: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle one frame and produce its reply.
    ///
    /// The first frame is always a password attempt, compared byte for byte
    /// with the secret. After it the session dispatches commands whatever
    /// the verdict was; anything that is not `/s` or `/q` gets
    /// `UNKNOWN COMMAND`. Command tokens tolerate a trailing line ending.
    pub fn handle(&mut self, content: &str) -> Reply {
        match self.phase {
            SessionPhase::AwaitingPassword => {
                self.phase = SessionPhase::Dispatching;
                self.check_password(content)
            }
            SessionPhase::Dispatching => match Command::parse(trim_line_ending(content)) {
                Some(Command::Start) => {
                    self.running = true;
                    Reply::Started
                }
                Some(Command::Stop) => {
                    self.running = false;
                    Reply::Stopped
                }
                None => Reply::UnknownCommand,
            },
        }
    }

    fn check_password(&mut self, candidate: &str) -> Reply {
        if candidate == self.secret {
            self.authenticated = true;
            Reply::Accepted
        } else {
            Reply::Denied
        }
    }
}
