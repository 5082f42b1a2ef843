//! Shared reply slot
//!
//! Single-valued mailbox between the receiver thread (producer) and the
//! command loop (consumer).

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, ServctlError};

/// Mailbox holding at most one unconsumed reply
///
/// ## Concurrency:
/// - `state`: one lock guards both the payload and the closed flag
/// - `available`: signalled on every publish and on close
///
/// A second publish before the first is consumed overwrites it. The client
/// never has more than one request outstanding, so nothing relevant is lost.
///
/// A wait that times out leaves its reply owed. The server answers every
/// request exactly once and in order, so the next published reply belongs to
/// the abandoned request and is dropped instead of being handed to whoever
/// waits next.
pub struct ReplySlot {
    state: Mutex<SlotState>,
    available: Condvar,
}

#[derive(Default)]
struct SlotState {
    /// Latest unconsumed reply; `Some` doubles as the has-reply flag
    payload: Option<String>,

    /// Set once the receiver has exited; no more replies will arrive
    closed: bool,

    /// Replies still owed to requests whose wait timed out
    abandoned: usize,
}

impl ReplySlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::default()),
            available: Condvar::new(),
        }
    }

    /// Store a reply and wake the waiting consumer
    pub fn publish(&self, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.state.lock();
        if state.abandoned > 0 {
            state.abandoned -= 1;
            tracing::debug!("Dropped late reply {:?}", value);
            return;
        }
        if let Some(previous) = state.payload.replace(value) {
            tracing::debug!("Overwrote unconsumed reply {:?}", previous);
        }
        self.available.notify_one();
    }

    /// Block until a reply is published, the slot is closed, or `timeout`
    /// elapses. `None` waits indefinitely.
    ///
    /// A reply that is already waiting is returned even after close.
    pub fn wait_for_reply(&self, timeout: Option<Duration>) -> Result<String> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();

        loop {
            if let Some(value) = state.payload.take() {
                return Ok(value);
            }
            if state.closed {
                return Err(ServctlError::ConnectionClosed);
            }

            match (deadline, timeout) {
                (Some(deadline), Some(limit)) => {
                    if self.available.wait_until(&mut state, deadline).timed_out() {
                        return match state.payload.take() {
                            Some(value) => Ok(value),
                            None if state.closed => Err(ServctlError::ConnectionClosed),
                            None => {
                                state.abandoned += 1;
                                Err(ServctlError::ReplyTimeout(limit))
                            }
                        };
                    }
                }
                _ => self.available.wait(&mut state),
            }
        }
    }

    /// Remove and return an unconsumed reply, if any
    pub fn take(&self) -> Option<String> {
        self.state.lock().payload.take()
    }

    pub fn has_reply(&self) -> bool {
        self.state.lock().payload.is_some()
    }

    /// Number of late replies that will still be dropped on arrival
    pub fn abandoned(&self) -> usize {
        self.state.lock().abandoned
    }

    /// Mark the slot closed and release any waiter
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for ReplySlot {
    fn default() -> Self {
        Self::new()
    }
}
