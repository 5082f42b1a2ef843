//! Reply definitions
//!
//! The server's reply vocabulary, and the classifier the client receiver uses
//! to tell correlated replies apart from unsolicited diagnostic pushes.

use std::fmt;

use super::DIAGNOSTIC_MARKER;

/// A server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Accepted,
    Denied,
    Started,
    Stopped,
    UnknownCommand,

    /// Anything outside the fixed vocabulary
    Other(String),
}

impl Reply {
    /// Match one of the canonical reply tokens exactly
    pub fn known(content: &str) -> Option<Self> {
        match content {
            "ACCEPTED" => Some(Reply::Accepted),
            "DENIED" => Some(Reply::Denied),
            "STARTED" => Some(Reply::Started),
            "STOPPED" => Some(Reply::Stopped),
            "UNKNOWN COMMAND" => Some(Reply::UnknownCommand),
            _ => None,
        }
    }

    /// Parse reply content, tolerating a trailing line ending
    pub fn parse(content: &str) -> Self {
        let content = trim_line_ending(content);
        Self::known(content).unwrap_or_else(|| Reply::Other(content.to_string()))
    }

    /// Wire token for this reply
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Accepted => "ACCEPTED",
            Reply::Denied => "DENIED",
            Reply::Started => "STARTED",
            Reply::Stopped => "STOPPED",
            Reply::UnknownCommand => "UNKNOWN COMMAND",
            Reply::Other(text) => text,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an inbound frame means to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Answer to the most recent request
    Reply(Reply),

    /// Unsolicited push, display only
    Diagnostic(String),
}

impl Inbound {
    /// Classify frame content.
    ///
    /// Exact reply tokens win over the diagnostic marker, and content that is
    /// neither still counts as a reply so a waiting command is released.
    pub fn classify(content: &str) -> Self {
        let content = trim_line_ending(content);

        if let Some(reply) = Reply::known(content) {
            return Inbound::Reply(reply);
        }
        if content.contains(DIAGNOSTIC_MARKER) {
            return Inbound::Diagnostic(content.to_string());
        }
        Inbound::Reply(Reply::Other(content.to_string()))
    }
}

/// Strip any trailing `\n` / `\r\n`
pub fn trim_line_ending(content: &str) -> &str {
    content.trim_end_matches(|c| c == '\r' || c == '\n')
}
