//! Command definitions
//!
//! The fixed command vocabulary a client sends once authenticated.

use super::Reply;

/// A control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the managed process (`/s`)
    Start,

    /// Stop the managed process (`/q`)
    Stop,
}

impl Command {
    /// Wire token for this command
    pub const fn token(self) -> &'static str {
        match self {
            Command::Start => "/s",
            Command::Stop => "/q",
        }
    }

    /// Parse frame content into a command, if it is one
    pub fn parse(content: &str) -> Option<Self> {
        match content {
            "/s" => Some(Command::Start),
            "/q" => Some(Command::Stop),
            _ => None,
        }
    }

    /// The reply that acknowledges this command
    pub fn acknowledgement(self) -> Reply {
        match self {
            Command::Start => Reply::Started,
            Command::Stop => Reply::Stopped,
        }
    }
}
