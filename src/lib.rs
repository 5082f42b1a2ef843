//! # servctl
//!
//! Remote server-control utility:
//! - Compact framed control protocol over TCP (version, length, content)
//! - Password authentication, then start/stop commands
//! - Unsolicited diagnostic pushes interleaved with command replies
//! - Client receiver thread that separates replies from pushes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐                    ┌──────────────────────┐
//! │    Command Loop      │                    │   Server Dispatcher  │
//! │   (ClientSession)    │ ── request frame ─▶│   (per connection)   │
//! └──────────▲───────────┘                    └──────┬────────┬──────┘
//!            │ wait_for_reply                        │ reply  │ /d push
//! ┌──────────┴───────────┐                    ┌──────▼────────▼──────┐
//! │      ReplySlot       │◀── reply ──────────│    Receiver Loop     │
//! └──────────────────────┘                    │  (classify frames)   │
//!                            Console ◀─ push ─┤                      │
//!                                             └──────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Precondition, Result, ServctlError};
pub use config::Config;
pub use client::{ClientSession, ClientState, ProcessStatus};
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of servctl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
