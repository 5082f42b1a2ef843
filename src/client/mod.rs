//! Client Module
//!
//! Operator-side half of the protocol.
//!
//! ## Architecture
//! - Command loop (`ClientSession`) on the caller's thread
//! - Receiver loop on a dedicated thread per connection
//! - `ReplySlot` is the only state both threads touch

mod console;
mod receiver;
mod session;
mod slot;

pub use console::{Console, LineSource, StdConsole, StdinLines};
pub use receiver::{run_receiver, spawn_receiver, ReceiverExit};
pub use session::{ClientSession, ClientState, ProcessStatus};
pub use slot::ReplySlot;
