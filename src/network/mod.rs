//! Network Module
//!
//! TCP server and per-connection dispatch.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One dispatcher thread per connection
//! - One diagnostic sender thread per connection, sharing the writer

mod server;
mod connection;
mod session;
mod diagnostics;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use session::{ServerSession, SessionPhase};
pub use diagnostics::DiagnosticSender;
