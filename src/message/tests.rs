use std::num::NonZeroU32;

use super::writer::encode_message;
use super::{DBusMessage, MessageKind, MessageReader};
use crate::buf::ByteBuffer;
use crate::object_path::OwnedObjectPath;
use crate::protocol::{Endianness, Flags};
use crate::signature::SignatureBuf;
use crate::value::{DBusValue, Variant};

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
fn hello_call_round_trips() {
    let message = hello_call();
    let bytes = encode_message(&message);

    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let decoded = MessageReader::try_read(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, message);
    assert_eq!(buf.remaining(), 0);
}

#[test]
fn partial_header_asks_for_more_bytes_without_consuming_any() {
    let bytes = encode_message(&hello_call());

    let mut buf = ByteBuffer::new();
    buf.append(&bytes[..bytes.len() - 1]);

    let mark = buf.mark();
    let result = MessageReader::try_read(&mut buf).unwrap();
    assert!(result.is_none());
    assert_eq!(buf.position(), mark.offset());
}

#[test]
fn chunked_delivery_yields_exactly_one_message_on_the_final_byte() {
    let bytes = encode_message(&hello_call());

    let mut buf = ByteBuffer::new();
    for (i, byte) in bytes.iter().enumerate() {
        buf.append(std::slice::from_ref(byte));
        let result = MessageReader::try_read(&mut buf).unwrap();

        if i + 1 == bytes.len() {
            assert!(result.is_some(), "expected a message after the final byte");
        } else {
            assert!(result.is_none(), "expected no message before the final byte");
        }
    }
}

#[test]
fn malformed_protocol_version_is_a_fatal_error() {
    let mut bytes = encode_message(&hello_call());
    // Byte 3 is the protocol version, per the fixed 12-byte header layout.
    bytes[3] = 2;

    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let err = MessageReader::try_read(&mut buf).unwrap_err();
    assert!(!err.is_need_more());
}

#[test]
fn oversized_body_length_is_rejected_without_waiting_for_the_bytes() {
    let mut bytes = encode_message(&hello_call());
    // Bytes 4..8 are the body length, per the fixed 12-byte header layout.
    // A claimed length past the maximum must fail fast rather than stall
    // forever waiting for bytes that will never arrive.
    bytes[4..8].copy_from_slice(&(u32::MAX).to_le_bytes());

    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let err = MessageReader::try_read(&mut buf).unwrap_err();
    assert!(!err.is_need_more());
}

#[test]
fn method_call_missing_member_is_rejected() {
    // The encoder can't produce this shape (a `MethodCall` always carries a
    // `Member`), so the header field array is assembled by hand with only
    // `Path` present.
    use crate::value::write_value;

    let path = OwnedObjectPath::new("/org/freedesktop/DBus").unwrap();
    let header_sig = crate::signature::Signature::new(b"a(yv)").unwrap();
    let header_array = DBusValue::Array(vec![DBusValue::Struct(vec![
        DBusValue::Byte(1), // HeaderField::PATH
        DBusValue::Variant(Box::new(Variant {
            signature: SignatureBuf::new(b"o".to_vec()).unwrap(),
            value: DBusValue::ObjectPath(path),
        })),
    ])]);

    let mut bytes = Vec::new();
    bytes.push(Endianness::LITTLE.0);
    bytes.push(1); // MethodCall
    bytes.push(Flags::EMPTY.0);
    bytes.push(1); // protocol version
    bytes.extend_from_slice(&0u32.to_le_bytes()); // body length
    bytes.extend_from_slice(&1u32.to_le_bytes()); // serial

    write_value(&mut bytes, Endianness::LITTLE, 0, &header_array, header_sig);
    crate::value::align_out(&mut bytes, 0, 8);

    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let err = MessageReader::try_read(&mut buf).unwrap_err();
    assert!(!err.is_need_more());
}

#[test]
fn signal_round_trips_with_dict_body() {
    let signature = SignatureBuf::new(b"a{sv}".to_vec()).unwrap();
    let body = vec![DBusValue::Dict(vec![(
        DBusValue::String("Owner".into()),
        DBusValue::Variant(Box::new(Variant {
            signature: SignatureBuf::new(b"s".to_vec()).unwrap(),
            value: DBusValue::String(":1.42".into()),
        })),
    )])];

    let message = DBusMessage {
        endianness: Endianness::BIG,
        kind: MessageKind::Signal {
            path: OwnedObjectPath::new("/org/freedesktop/DBus").unwrap(),
            interface: "org.freedesktop.DBus".into(),
            member: "NameOwnerChanged".into(),
        },
        flags: Flags::NO_REPLY_EXPECTED,
        serial: NonZeroU32::new(7).unwrap(),
        interface: None,
        destination: None,
        sender: Some("org.freedesktop.DBus".into()),
        unix_fds: None,
        signature: Some(signature),
        body,
    };

    let bytes = encode_message(&message);
    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let decoded = MessageReader::try_read(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn error_reply_round_trips() {
    let message = DBusMessage {
        endianness: Endianness::LITTLE,
        kind: MessageKind::Error {
            error_name: "org.freedesktop.DBus.Error.UnknownMethod".into(),
            reply_serial: NonZeroU32::new(3).unwrap(),
        },
        flags: Flags::EMPTY,
        serial: NonZeroU32::new(9).unwrap(),
        interface: None,
        destination: Some(":1.7".into()),
        sender: Some("org.freedesktop.DBus".into()),
        unix_fds: None,
        signature: Some(SignatureBuf::new(b"s".to_vec()).unwrap()),
        body: vec![DBusValue::String("no such method".into())],
    };

    let bytes = encode_message(&message);
    let mut buf = ByteBuffer::new();
    buf.append(&bytes);

    let decoded = MessageReader::try_read(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, message);
}
