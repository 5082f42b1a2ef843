//! Error types for servctl
//!
//! Provides a unified error type for all operations.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::Reply;

/// Result type alias using ServctlError
pub type Result<T> = std::result::Result<T, ServctlError>;

/// Unified error type for servctl operations
#[derive(Debug, Error)]
pub enum ServctlError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to {addr}: {source}")]
    ConnectFailure {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("No reply within {0:?}")]
    ReplyTimeout(Duration),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Frame decode failed: {0}")]
    FrameDecode(String),

    #[error("Frame content too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Authentication rejected: server replied {0}")]
    AuthenticationRejected(Reply),

    #[error("{0}")]
    Precondition(Precondition),

    #[error("Unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply { expected: Reply, got: Reply },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A client operation was requested from a state that does not allow it.
///
/// Reported before any network I/O is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    NotConnected,
    AlreadyConnected,
    NotAuthenticated,
    AlreadyAuthenticated,
    AlreadyRunning,
    AlreadyStopped,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Precondition::NotConnected => "not connected",
            Precondition::AlreadyConnected => "already connected",
            Precondition::NotAuthenticated => "not authenticated",
            Precondition::AlreadyAuthenticated => "already authenticated",
            Precondition::AlreadyRunning => "already running",
            Precondition::AlreadyStopped => "already stopped",
        };
        f.write_str(msg)
    }
}

impl From<Precondition> for ServctlError {
    fn from(p: Precondition) -> Self {
        ServctlError::Precondition(p)
    }
}
