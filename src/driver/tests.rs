use std::num::NonZeroU32;

use super::{DriverEvent, StreamDriver};
use crate::message::writer::encode_message;
use crate::message::{DBusMessage, MessageKind};
use crate::object_path::OwnedObjectPath;
use crate::protocol::{Endianness, Flags};

/// Route this crate's `tracing` events to the test harness's captured
/// output, so a failing test's `--nocapture` run shows the driver's own
/// `trace`/`debug`/`error` lines alongside the assertion failure.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn hello_call() -> DBusMessage {
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
    }
}

#[test]
fn auth_lines_then_binary_message_in_one_chunk() {
    let mut driver = StreamDriver::new();
    let mut chunk = b"OK 1234\r\nAGREE_UNIX_FD\r\n".to_vec();
    chunk.extend_from_slice(&encode_message(&hello_call()));

    let events = driver.feed(&chunk).unwrap();

    assert_eq!(
        events,
        vec![
            DriverEvent::AuthLine("OK 1234".into()),
            DriverEvent::AuthLine("AGREE_UNIX_FD".into()),
            DriverEvent::Message(hello_call()),
        ]
    );
}

#[test]
fn auth_lines_arrive_before_the_binary_phase_is_fed() {
    let mut driver = StreamDriver::new();
    let events = driver.feed(b"OK 1234\r\n").unwrap();
    assert_eq!(events, vec![DriverEvent::AuthLine("OK 1234".into())]);

    let events = driver.feed(&encode_message(&hello_call())).unwrap();
    assert_eq!(events, vec![DriverEvent::Message(hello_call())]);
}

#[test]
fn literal_begin_line_switches_phase_directly() {
    let mut driver = StreamDriver::new();
    let mut chunk = b"BEGIN\r\n".to_vec();
    chunk.extend_from_slice(&encode_message(&hello_call()));

    let events = driver.feed(&chunk).unwrap();
    assert_eq!(
        events,
        vec![DriverEvent::AuthLine("BEGIN".into()), DriverEvent::Message(hello_call())]
    );
}

#[test]
fn chunked_header_emits_exactly_one_message_on_the_last_byte() {
    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let bytes = encode_message(&hello_call());
    let mut seen = 0;

    for (i, byte) in bytes.iter().enumerate() {
        let events = driver.feed(std::slice::from_ref(byte)).unwrap();
        seen += events.len();

        if i + 1 == bytes.len() {
            assert_eq!(events, vec![DriverEvent::Message(hello_call())]);
        } else {
            assert!(events.is_empty());
        }
    }

    assert_eq!(seen, 1);
}

#[test]
fn malformed_message_closes_the_session() {
    init_tracing();

    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let mut bytes = encode_message(&hello_call());
    bytes[3] = 2; // corrupt the protocol version

    let err = driver.feed(&bytes).unwrap_err();
    assert!(!err.is_need_more());

    // Once failed, the session stays closed without re-raising the error.
    let events = driver.feed(b"anything").unwrap();
    assert_eq!(events, vec![DriverEvent::Closed]);
}

#[test]
fn clean_end_of_stream_with_nothing_buffered_is_not_an_error() {
    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();
    driver.feed(&encode_message(&hello_call())).unwrap();

    let events = driver.end_of_stream().unwrap();
    assert_eq!(events, vec![DriverEvent::Closed]);
}

#[test]
fn end_of_stream_mid_message_is_transport_closed() {
    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let bytes = encode_message(&hello_call());
    driver.feed(&bytes[..bytes.len() - 1]).unwrap();

    let err = driver.end_of_stream().unwrap_err();
    assert!(!err.is_need_more());

    let events = driver.end_of_stream().unwrap();
    assert_eq!(events, vec![DriverEvent::Closed]);
}

#[test]
fn end_of_stream_mid_auth_line_is_transport_closed() {
    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\nAGREE_UNIX_FD").unwrap();

    let err = driver.end_of_stream().unwrap_err();
    assert!(!err.is_need_more());
}

#[test]
fn good_message_then_bad_message_in_one_chunk_keeps_the_good_one() {
    init_tracing();

    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let mut first = hello_call();
    first.serial = NonZeroU32::new(1).unwrap();

    let mut bytes = encode_message(&first);
    let mut corrupt = encode_message(&hello_call());
    corrupt[3] = 2; // corrupt the second message's protocol version
    bytes.extend_from_slice(&corrupt);

    let err = driver.feed(&bytes).unwrap_err();
    assert!(!err.is_need_more());
    assert_eq!(err.events, vec![DriverEvent::Message(first), DriverEvent::Closed]);

    // The session is closed; it doesn't re-raise on the next feed.
    let events = driver.feed(b"anything").unwrap();
    assert_eq!(events, vec![DriverEvent::Closed]);
}

#[test]
fn two_messages_back_to_back_in_one_chunk_both_decode() {
    let mut driver = StreamDriver::new();
    driver.feed(b"OK 1234\r\n").unwrap();

    let mut first = hello_call();
    first.serial = NonZeroU32::new(1).unwrap();
    let mut second = hello_call();
    second.serial = NonZeroU32::new(2).unwrap();

    let mut chunk = encode_message(&first);
    chunk.extend_from_slice(&encode_message(&second));

    let events = driver.feed(&chunk).unwrap();
    assert_eq!(
        events,
        vec![DriverEvent::Message(first), DriverEvent::Message(second)]
    );
}
