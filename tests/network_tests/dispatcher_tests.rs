//! Tests for the server-side dispatcher
//!
//! These tests verify:
//! - Password phase and command dispatch of ServerSession
//! - Diagnostic sender framing, cadence and shutdown

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use servctl::network::{DiagnosticSender, ServerSession, SessionPhase};
use servctl::protocol::{read_packet, Reply};

// =============================================================================
// ServerSession Tests
// =============================================================================

#[test]
fn test_first_frame_is_password() {
    let mut session = ServerSession::new("secret");
    assert_eq!(session.phase(), SessionPhase::AwaitingPassword);

    assert_eq!(session.handle("secret"), Reply::Accepted);
    assert_eq!(session.phase(), SessionPhase::Dispatching);
    assert!(session.is_authenticated());
}

#[test]
fn test_wrong_password_still_moves_to_dispatching() {
    let mut session = ServerSession::new("secret");

    assert_eq!(session.handle("guess"), Reply::Denied);
    assert_eq!(session.phase(), SessionPhase::Dispatching);
    assert!(!session.is_authenticated());
}

#[test]
fn test_content_after_denial_is_unknown_command() {
    let mut session = ServerSession::new("secret");

    assert_eq!(session.handle("guess"), Reply::Denied);
    assert_eq!(session.handle("another"), Reply::UnknownCommand);
    assert_eq!(session.handle("secret"), Reply::UnknownCommand);
    assert!(!session.is_authenticated());
    assert!(!session.is_running());
}

#[test]
fn test_password_is_literal_match() {
    let mut session = ServerSession::new("secret");
    assert_eq!(session.handle("Secret"), Reply::Denied);

    let mut session = ServerSession::new("secret");
    assert_eq!(session.handle("secret "), Reply::Denied);

    let mut session = ServerSession::new("secret");
    assert_eq!(session.handle("secret\n"), Reply::Denied);

    let mut session = ServerSession::new("secret");
    assert_eq!(session.handle("secret\r\n"), Reply::Denied);
}

#[test]
fn test_command_tokens_tolerate_line_ending() {
    let mut session = ServerSession::new("secret");
    session.handle("secret");

    assert_eq!(session.handle("/s\n"), Reply::Started);
    assert_eq!(session.handle("/q\r\n"), Reply::Stopped);
    assert_eq!(session.handle("/s "), Reply::UnknownCommand);
}

#[test]
fn test_start_stop_toggle_running() {
    let mut session = ServerSession::new("secret");
    session.handle("secret");

    assert_eq!(session.handle("/s"), Reply::Started);
    assert!(session.is_running());
    assert_eq!(session.handle("/s"), Reply::Started);
    assert!(session.is_running());
    assert_eq!(session.handle("/q"), Reply::Stopped);
    assert!(!session.is_running());
}

#[test]
fn test_unknown_command_leaves_state_unchanged() {
    let mut session = ServerSession::new("secret");
    session.handle("secret");
    session.handle("/s");

    assert_eq!(session.handle("/x"), Reply::UnknownCommand);
    assert_eq!(session.handle("secret"), Reply::UnknownCommand);
    assert!(session.is_running());
    assert!(session.is_authenticated());
}

#[test]
fn test_commands_dispatch_after_denied_password() {
    let mut session = ServerSession::new("secret");
    session.handle("guess");

    assert_eq!(session.handle("/s"), Reply::Started);
    assert_eq!(session.handle("/q"), Reply::Stopped);
}

// =============================================================================
// DiagnosticSender Tests
// =============================================================================

fn decode_all(bytes: Vec<u8>) -> Vec<String> {
    let mut cursor = Cursor::new(bytes);
    let mut out = Vec::new();
    loop {
        let packet = read_packet(&mut cursor);
        if packet.is_sentinel() {
            return out;
        }
        out.push(packet.text().into_owned());
    }
}

#[test]
fn test_diagnostics_are_counted_frames() {
    let writer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sender = DiagnosticSender::spawn(
        Arc::clone(&writer),
        Duration::ZERO,
        Duration::from_millis(20),
        "test",
    )
    .unwrap();

    thread::sleep(Duration::from_millis(150));
    let sent = sender.stop();
    assert!(sent >= 2, "expected several pushes, got {}", sent);

    let frames = decode_all(writer.lock().clone());
    assert_eq!(frames.len() as u64, sent);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame, &format!("/d {}", i + 1));
    }
}

#[test]
fn test_stop_during_initial_delay_sends_nothing() {
    let writer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sender = DiagnosticSender::spawn(
        Arc::clone(&writer),
        Duration::from_secs(60),
        Duration::from_millis(10),
        "test",
    )
    .unwrap();

    assert_eq!(sender.stop(), 0);
    assert!(writer.lock().is_empty());
}

#[test]
fn test_drop_stops_sender() {
    let writer = Arc::new(Mutex::new(Vec::<u8>::new()));
    {
        let _sender = DiagnosticSender::spawn(
            Arc::clone(&writer),
            Duration::ZERO,
            Duration::from_millis(10),
            "test",
        )
        .unwrap();
        thread::sleep(Duration::from_millis(30));
    }

    let after_drop = writer.lock().len();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(writer.lock().len(), after_drop);
    assert!(Arc::strong_count(&writer) == 1);
}
