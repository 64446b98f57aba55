//! Crate-level property tests: these exercise [`StreamDriver`] across the
//! message and driver modules together, rather than any one type in
//! isolation.

use std::num::NonZeroU32;

use anyhow::Result;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use crate::buf::ByteBuffer;
use crate::message::writer::encode_message;
use crate::message::{DBusMessage, MessageKind, MessageReader};
use crate::object_path::OwnedObjectPath;
use crate::protocol::{Endianness, Flags};
use crate::{DriverEvent, StreamDriver};

/// The canonical "Hello call": a `MethodCall` to `org.freedesktop.DBus`'s
/// `Hello` method, no body, serial 1. Encodes to exactly 128 bytes and
/// decodes back to the same message.
#[test]
fn hello_call_encodes_to_exactly_128_bytes() -> Result<()> {
    let message = DBusMessage {
        endianness: Endianness::LITTLE,
        kind: MessageKind::MethodCall {
            path: OwnedObjectPath::new("/org/freedesktop/DBus")?,
            member: "Hello".into(),
        },
        flags: Flags::EMPTY,
        serial: NonZeroU32::new(1).unwrap(),
        interface: Some("org.freedesktop.DBus".into()),
        destination: Some("org.freedesktop.DBus".into()),
        sender: None,
        unix_fds: None,
        signature: None,
        body: Vec::new(),
    };

    let bytes = encode_message(&message);
    assert_eq!(bytes.len(), 128, "encoded Hello call must be exactly 128 bytes");

    let mut buf = ByteBuffer::new();
    buf.append(&bytes);
    let decoded = MessageReader::try_read(&mut buf)?.expect("a full message is buffered");
    assert_eq!(decoded, message);
    assert_eq!(buf.remaining(), 0);

    Ok(())
}

fn sample_messages() -> Vec<DBusMessage> {
    vec![
        DBusMessage {
            endianness: Endianness::LITTLE,
            kind: MessageKind::MethodCall {
                path: OwnedObjectPath::new("/org/freedesktop/DBus").unwrap(),
                member: "Hello".into(),
            },
            flags: Flags::EMPTY,
            serial: NonZeroU32::new(1).unwrap(),
            interface: Some("org.freedesktop.DBus".into()),
            destination: Some("org.freedesktop.DBus".into()),
            sender: None,
            unix_fds: None,
            signature: None,
            body: Vec::new(),
        },
        DBusMessage {
            endianness: Endianness::BIG,
            kind: MessageKind::Signal {
                path: OwnedObjectPath::new("/org/freedesktop/DBus").unwrap(),
                interface: "org.freedesktop.DBus".into(),
                member: "NameOwnerChanged".into(),
            },
            flags: Flags::NO_REPLY_EXPECTED,
            serial: NonZeroU32::new(2).unwrap(),
            interface: None,
            destination: None,
            sender: Some("org.freedesktop.DBus".into()),
            unix_fds: None,
            signature: None,
            body: Vec::new(),
        },
    ]
}

/// However the bytes of a stretch of valid messages are sliced into chunks
/// fed one at a time, the driver emits exactly the same messages in the
/// same order as feeding everything in a single chunk.
#[quickcheck]
fn arbitrary_chunking_of_valid_messages_preserves_order(chunk_sizes: Vec<u8>) -> TestResult {
    if chunk_sizes.is_empty() {
        return TestResult::discard();
    }

    let messages = sample_messages();
    let mut bytes = Vec::new();
    for message in &messages {
        bytes.extend_from_slice(&encode_message(message));
    }

    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let mut decoded = Vec::new();
    let mut offset = 0;
    let mut cursor = 0;

    while offset < bytes.len() {
        // Cycle through the supplied sizes, clamped to at least one byte,
        // so every input (however degenerate) makes forward progress.
        let size = (chunk_sizes[cursor % chunk_sizes.len()] as usize % 7) + 1;
        cursor += 1;

        let end = (offset + size).min(bytes.len());
        let events = match driver.feed(&bytes[offset..end]) {
            Ok(events) => events,
            Err(_) => return TestResult::failed(),
        };

        for event in events {
            if let DriverEvent::Message(message) = event {
                decoded.push(message);
            }
        }

        offset = end;
    }

    TestResult::from_bool(decoded == messages)
}

/// No sequence of arbitrary bytes, fed through the AUTH phase and then the
/// binary phase, ever panics the driver — it always settles on either more
/// decoded messages or a fatal (non-`NeedMore`) error.
#[quickcheck]
fn arbitrary_bytes_never_panic_the_driver(auth: String, body: Vec<u8>) -> TestResult {
    if auth.contains('\0') {
        return TestResult::discard();
    }

    let mut driver = StreamDriver::new();
    let mut auth_chunk = auth.replace("\r\n", "").into_bytes();
    auth_chunk.extend_from_slice(b"\r\n");

    if driver.feed(&auth_chunk).is_err() {
        return TestResult::passed();
    }

    let _ = driver.feed(&body);
    TestResult::passed()
}
