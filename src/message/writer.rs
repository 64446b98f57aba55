//! The symmetric encoder: assembles the bytes [`MessageReader`] consumes.
//!
//! [`MessageReader`]: super::MessageReader

use crate::protocol::{Endianness, HeaderField};
use crate::signature::Signature;
use crate::value::{align_out, write_frame, write_value, DBusValue, Variant};

use super::{DBusMessage, MessageKind};

/// Encode `message` into its wire representation at `message.endianness`.
///
/// Mirrors [`MessageReader::try_read`][super::MessageReader::try_read]
/// exactly: the fixed 12-byte header, the `a(yv)` header field array, an
/// align-to-8 gap, then the body per `message.signature`.
pub fn encode_message(message: &DBusMessage) -> Vec<u8> {
    let endianness = message.endianness;
    let mut out = Vec::new();

    out.push(endianness.0);
    out.push(message.message_type());
    out.push(message.flags.0);
    out.push(1); // protocol version

    let body_length_at = out.len();
    out.extend_from_slice(&[0, 0, 0, 0]);
    write_frame(&mut out, endianness, message.serial.get());

    let header_array = DBusValue::Array(header_field_entries(message));
    let header_sig = Signature::new(b"a(yv)").expect("a(yv) is always a valid signature");
    write_value(&mut out, endianness, 0, &header_array, header_sig);

    align_out(&mut out, 0, 8);
    let body_base = out.len();

    if let Some(signature) = &message.signature {
        for (value, sig) in message.body.iter().zip(signature.split()) {
            write_value(&mut out, endianness, body_base, value, sig);
        }
    }

    let body_length = (out.len() - body_base) as u32;
    let patched = match endianness {
        Endianness::LITTLE => body_length.to_le_bytes(),
        Endianness::BIG => body_length.to_be_bytes(),
        _ => unreachable!("endianness is always l or B"),
    };
    out[body_length_at..body_length_at + 4].copy_from_slice(&patched);

    out
}

/// Build the `(yv)` struct entries for every header field this message
/// carries, from whichever of its fields are `Some`/required by its kind.
fn header_field_entries(message: &DBusMessage) -> Vec<DBusValue> {
    let mut entries = Vec::new();

    match &message.kind {
        MessageKind::MethodCall { path, member } => {
            push(&mut entries, HeaderField::PATH, DBusValue::ObjectPath(path.clone()));
            push(&mut entries, HeaderField::MEMBER, DBusValue::String(member.clone()));
        }
        MessageKind::MethodReturn { reply_serial } => {
            push(
                &mut entries,
                HeaderField::REPLY_SERIAL,
                DBusValue::Uint32(reply_serial.get()),
            );
        }
        MessageKind::Error {
            error_name,
            reply_serial,
        } => {
            push(
                &mut entries,
                HeaderField::ERROR_NAME,
                DBusValue::String(error_name.clone()),
            );
            push(
                &mut entries,
                HeaderField::REPLY_SERIAL,
                DBusValue::Uint32(reply_serial.get()),
            );
        }
        MessageKind::Signal {
            path,
            interface,
            member,
        } => {
            push(&mut entries, HeaderField::PATH, DBusValue::ObjectPath(path.clone()));
            push(
                &mut entries,
                HeaderField::INTERFACE,
                DBusValue::String(interface.clone()),
            );
            push(&mut entries, HeaderField::MEMBER, DBusValue::String(member.clone()));
        }
    }

    if let Some(interface) = &message.interface {
        push(&mut entries, HeaderField::INTERFACE, DBusValue::String(interface.clone()));
    }

    if let Some(destination) = &message.destination {
        push(
            &mut entries,
            HeaderField::DESTINATION,
            DBusValue::String(destination.clone()),
        );
    }

    if let Some(sender) = &message.sender {
        push(&mut entries, HeaderField::SENDER, DBusValue::String(sender.clone()));
    }

    if let Some(signature) = &message.signature {
        push(
            &mut entries,
            HeaderField::SIGNATURE,
            DBusValue::Signature(signature.clone()),
        );
    }

    if let Some(unix_fds) = message.unix_fds {
        push(&mut entries, HeaderField::UNIX_FDS, DBusValue::Uint32(unix_fds));
    }

    entries
}

fn push(entries: &mut Vec<DBusValue>, code: HeaderField, value: DBusValue) {
    let signature = value_signature(&value);

    entries.push(DBusValue::Struct(vec![
        DBusValue::Byte(code.0),
        DBusValue::Variant(Box::new(Variant { signature, value })),
    ]));
}

fn value_signature(value: &DBusValue) -> crate::signature::SignatureBuf {
    use crate::signature::SignatureBuf;

    let bytes: &[u8] = match value {
        DBusValue::Byte(_) => b"y",
        DBusValue::Boolean(_) => b"b",
        DBusValue::Int16(_) => b"n",
        DBusValue::Uint16(_) => b"q",
        DBusValue::Int32(_) => b"i",
        DBusValue::Uint32(_) => b"u",
        DBusValue::Int64(_) => b"x",
        DBusValue::Uint64(_) => b"t",
        DBusValue::Double(_) => b"d",
        DBusValue::String(_) => b"s",
        DBusValue::ObjectPath(_) => b"o",
        DBusValue::Signature(_) => b"g",
        DBusValue::UnixFd(_) => b"h",
        DBusValue::Variant(_) => b"v",
        // Header field values are always basic types or a variant; structs,
        // arrays and dicts never appear as a header field's own value.
        DBusValue::Struct(_) | DBusValue::Array(_) | DBusValue::Dict(_) => {
            unreachable!("header field values are always basic or variant")
        }
    };

    SignatureBuf::new(bytes).expect("fixed signature literal is always valid")
}
