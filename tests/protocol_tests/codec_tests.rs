//! Codec Tests
//!
//! Tests for frame encoding/decoding.

use std::io::Cursor;

use servctl::protocol::{
    decode_packet, encode_packet, read_packet, try_read_packet, write_packet, Packet,
    CURRENT_VERSION, HEADER_SIZE, MAX_MESSAGE_LENGTH,
};
use servctl::ServctlError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let frame = encode_packet(b"/s").unwrap();

    assert_eq!(frame.len(), HEADER_SIZE + 2);
    assert_eq!(frame[0], CURRENT_VERSION);
    assert_eq!(&frame[1..3], &[0x00, 0x02]);
    assert_eq!(&frame[3..], b"/s");
}

#[test]
fn test_encode_length_is_big_endian() {
    let content = vec![b'x'; 0x0102];
    let frame = encode_packet(&content).unwrap();

    assert_eq!(frame[1], 0x01);
    assert_eq!(frame[2], 0x02);
}

#[test]
fn test_encode_empty_content() {
    let frame = encode_packet(b"").unwrap();
    assert_eq!(&frame[..], &[CURRENT_VERSION, 0x00, 0x00]);
}

#[test]
fn test_encode_rejects_oversized_content() {
    let content = vec![b'a'; MAX_MESSAGE_LENGTH + 1];

    match encode_packet(&content) {
        Err(ServctlError::FrameTooLarge { len, max }) => {
            assert_eq!(len, MAX_MESSAGE_LENGTH + 1);
            assert_eq!(max, MAX_MESSAGE_LENGTH);
        }
        other => panic!("Expected FrameTooLarge, got {:?}", other),
    }
}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_round_trip_preserves_content() {
    let cases = [
        String::new(),
        "secret".to_string(),
        "UNKNOWN COMMAND".to_string(),
        "/d 3".to_string(),
        "line\nwith\0embedded bytes".to_string(),
        "é".repeat(MAX_MESSAGE_LENGTH / 2),
        "z".repeat(MAX_MESSAGE_LENGTH),
    ];

    for content in cases {
        let frame = encode_packet(content.as_bytes()).unwrap();
        let packet = decode_packet(&frame).unwrap();

        assert_eq!(packet.version, CURRENT_VERSION);
        assert_eq!(packet.content_length as usize, content.len());
        assert_eq!(packet.text(), content.as_str());
        assert!(packet.is_well_formed());
    }
}

#[test]
fn test_consecutive_frames_split_by_declared_length() {
    let mut stream = Vec::new();
    write_packet(&mut stream, b"ACCEPTED").unwrap();
    write_packet(&mut stream, b"").unwrap();
    write_packet(&mut stream, b"/d 1").unwrap();

    let mut cursor = Cursor::new(stream);
    assert_eq!(read_packet(&mut cursor).text(), "ACCEPTED");
    assert_eq!(read_packet(&mut cursor).content_length, 0);
    assert_eq!(read_packet(&mut cursor).text(), "/d 1");
    assert!(read_packet(&mut cursor).is_sentinel());
}

// =============================================================================
// Truncation Tests
// =============================================================================

fn truncated(content: &[u8], keep: usize) -> Cursor<Vec<u8>> {
    let frame = encode_packet(content).unwrap();
    Cursor::new(frame[..keep].to_vec())
}

#[test]
fn test_empty_stream_is_connection_closed() {
    let mut cursor = Cursor::new(Vec::new());

    assert!(matches!(
        try_read_packet(&mut cursor),
        Err(ServctlError::ConnectionClosed)
    ));
    assert!(read_packet(&mut Cursor::new(Vec::new())).is_sentinel());
}

#[test]
fn test_truncated_after_version_yields_sentinel() {
    let packet = read_packet(&mut truncated(b"STARTED", 1));

    assert_eq!(packet, Packet::sentinel());
    assert!(matches!(
        try_read_packet(&mut truncated(b"STARTED", 1)),
        Err(ServctlError::FrameDecode(_))
    ));
}

#[test]
fn test_truncated_mid_length_yields_sentinel() {
    let packet = read_packet(&mut truncated(b"STARTED", 2));
    assert_eq!(packet, Packet::sentinel());
}

#[test]
fn test_truncated_after_length_yields_sentinel() {
    let packet = read_packet(&mut truncated(b"STARTED", HEADER_SIZE));
    assert_eq!(packet, Packet::sentinel());
}

#[test]
fn test_truncated_mid_content_yields_sentinel() {
    let packet = read_packet(&mut truncated(b"STARTED", HEADER_SIZE + 4));

    assert_eq!(packet.version, 0);
    assert_eq!(packet.content_length, 0);
    assert!(packet.content.is_empty());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_wrong_version_is_rejected() {
    let mut frame = encode_packet(b"STOPPED").unwrap().to_vec();
    frame[0] = 2;

    assert!(matches!(
        try_read_packet(&mut Cursor::new(frame.clone())),
        Err(ServctlError::FrameDecode(_))
    ));
    assert!(read_packet(&mut Cursor::new(frame)).is_sentinel());
}

#[test]
fn test_zero_version_on_wire_is_rejected() {
    let frame = vec![0u8, 0x00, 0x01, b'x'];
    assert!(read_packet(&mut Cursor::new(frame)).is_sentinel());
}

#[test]
fn test_oversized_declared_length_is_rejected() {
    let declared = (MAX_MESSAGE_LENGTH + 1) as u16;
    let mut frame = vec![CURRENT_VERSION];
    frame.extend_from_slice(&declared.to_be_bytes());
    frame.extend(std::iter::repeat(b'a').take(declared as usize));

    assert!(matches!(
        try_read_packet(&mut Cursor::new(frame)),
        Err(ServctlError::FrameDecode(_))
    ));
}

#[test]
fn test_sentinel_is_not_well_formed() {
    let sentinel = Packet::sentinel();

    assert!(sentinel.is_sentinel());
    assert!(!sentinel.is_well_formed());
}

#[test]
fn test_write_packet_rejects_oversized_without_writing() {
    let mut sink = Vec::new();
    let content = vec![b'a'; MAX_MESSAGE_LENGTH + 10];

    assert!(write_packet(&mut sink, &content).is_err());
    assert!(sink.is_empty());
}
