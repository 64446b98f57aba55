use std::num::NonZeroU32;

use crate::buf::{read_frame, ByteBuffer, MAX_BODY_LENGTH};
use crate::error::{Error, Result};
use crate::object_path::OwnedObjectPath;
use crate::protocol::{Endianness, Flags, HeaderField, MessageType};
use crate::signature::{Signature, SignatureBuf};
use crate::value::{read_value, DBusValue};

use super::{DBusMessage, MessageKind};

/// Signature of the header field array every message carries: a sequence
/// of `(yv)` structs, code byte paired with a self-describing variant.
fn header_fields_signature() -> &'static Signature {
    Signature::new(b"a(yv)").expect("a(yv) is always a valid signature")
}

/// Reads one [`DBusMessage`] at a time out of a [`ByteBuffer`].
///
/// Stateless: all per-message state lives on the buffer's read cursor. A
/// caller that wants to skip the AUTH phase entirely (tests, or a transport
/// that has already negotiated it elsewhere) can drive this directly
/// instead of going through [`StreamDriver`][crate::StreamDriver].
pub struct MessageReader;

impl MessageReader {
    /// Attempt to read a complete message from the front of `buf`.
    ///
    /// Transactional: on success the message's bytes are fully consumed; on
    /// a `NeedMore` condition the cursor is rolled back to exactly where it
    /// started and `Ok(None)` is returned; any other error is fatal and the
    /// caller is expected to abandon the session.
    pub fn try_read(buf: &mut ByteBuffer) -> Result<Option<DBusMessage>> {
        let mark = buf.mark();

        match read_message(buf, mark.offset()) {
            Ok(message) => Ok(Some(message)),
            Err(error) if error.is_need_more() => {
                buf.reset_to(mark);
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

/// Header fields collected out of the `a(yv)` array, dispatched through a
/// table indexed by code so unknown codes are ignored by construction.
#[derive(Default)]
struct HeaderFields {
    path: Option<OwnedObjectPath>,
    interface: Option<String>,
    member: Option<String>,
    error_name: Option<String>,
    reply_serial: Option<NonZeroU32>,
    destination: Option<String>,
    sender: Option<String>,
    signature: Option<SignatureBuf>,
    unix_fds: Option<u32>,
}

impl HeaderFields {
    fn from_array(array: DBusValue) -> Result<Self> {
        let DBusValue::Array(entries) = array else {
            return Err(Error::malformed_header("header field array has the wrong shape"));
        };

        let mut fields = HeaderFields::default();

        for entry in entries {
            let DBusValue::Struct(mut elements) = entry else {
                return Err(Error::malformed_header("header field entry has the wrong shape"));
            };

            if elements.len() != 2 {
                return Err(Error::malformed_header("header field entry has the wrong shape"));
            }

            let variant = elements.pop().expect("checked length above");
            let code = elements.pop().expect("checked length above");

            let DBusValue::Byte(code) = code else {
                return Err(Error::malformed_header("header field code must be a byte"));
            };

            let DBusValue::Variant(variant) = variant else {
                return Err(Error::malformed_header("header field value must be a variant"));
            };

            fields.set(HeaderField(code), variant.value);
        }

        Ok(fields)
    }

    /// Dispatch a single decoded `(code, value)` pair by code. Unknown
    /// codes, and values of the wrong type for a known code, are silently
    /// ignored — the wire format does not guarantee senders only use codes
    /// this reader understands.
    fn set(&mut self, code: HeaderField, value: DBusValue) {
        match code {
            HeaderField::PATH => {
                if let DBusValue::ObjectPath(path) = value {
                    self.path = Some(path);
                }
            }
            HeaderField::INTERFACE => {
                if let DBusValue::String(interface) = value {
                    self.interface = Some(interface);
                }
            }
            HeaderField::MEMBER => {
                if let DBusValue::String(member) = value {
                    self.member = Some(member);
                }
            }
            HeaderField::ERROR_NAME => {
                if let DBusValue::String(error_name) = value {
                    self.error_name = Some(error_name);
                }
            }
            HeaderField::REPLY_SERIAL => {
                if let DBusValue::Uint32(reply_serial) = value {
                    self.reply_serial = NonZeroU32::new(reply_serial);
                }
            }
            HeaderField::DESTINATION => {
                if let DBusValue::String(destination) = value {
                    self.destination = Some(destination);
                }
            }
            HeaderField::SENDER => {
                if let DBusValue::String(sender) = value {
                    self.sender = Some(sender);
                }
            }
            HeaderField::SIGNATURE => {
                if let DBusValue::Signature(signature) = value {
                    self.signature = Some(signature);
                }
            }
            HeaderField::UNIX_FDS => {
                if let DBusValue::Uint32(unix_fds) = value {
                    self.unix_fds = Some(unix_fds);
                }
            }
            _ => {}
        }
    }

    /// Validate the required-field rules for `message_type` and build the
    /// type-specific [`MessageKind`], consuming the fields it claims.
    fn into_kind(&mut self, message_type: MessageType) -> Result<MessageKind> {
        Ok(match message_type {
            MessageType::METHOD_CALL => MessageKind::MethodCall {
                path: self
                    .path
                    .take()
                    .ok_or_else(|| Error::malformed_header("method call is missing Path"))?,
                member: self
                    .member
                    .take()
                    .ok_or_else(|| Error::malformed_header("method call is missing Member"))?,
            },
            MessageType::METHOD_RETURN => MessageKind::MethodReturn {
                reply_serial: self
                    .reply_serial
                    .ok_or_else(|| Error::malformed_header("method return is missing ReplySerial"))?,
            },
            MessageType::ERROR => MessageKind::Error {
                error_name: self
                    .error_name
                    .take()
                    .ok_or_else(|| Error::malformed_header("error is missing ErrorName"))?,
                reply_serial: self
                    .reply_serial
                    .ok_or_else(|| Error::malformed_header("error is missing ReplySerial"))?,
            },
            MessageType::SIGNAL => MessageKind::Signal {
                path: self
                    .path
                    .take()
                    .ok_or_else(|| Error::malformed_header("signal is missing Path"))?,
                interface: self
                    .interface
                    .take()
                    .ok_or_else(|| Error::malformed_header("signal is missing Interface"))?,
                member: self
                    .member
                    .take()
                    .ok_or_else(|| Error::malformed_header("signal is missing Member"))?,
            },
            _ => return Err(Error::malformed_header("unknown message type code")),
        })
    }
}

fn read_message(buf: &mut ByteBuffer, base: usize) -> Result<DBusMessage> {
    if buf.remaining() < 12 {
        return Err(Error::need_more());
    }

    let endian_byte = buf.peek(1).expect("checked remaining above")[0];
    let endianness = Endianness::from_byte(endian_byte)
        .ok_or_else(|| Error::malformed_header("endianness byte must be 'l' or 'B'"))?;
    buf.consume(1);

    let message_type = MessageType(buf.take(1)?[0]);
    let flags = Flags(buf.take(1)?[0]);

    let version = buf.take(1)?[0];
    if version != 1 {
        return Err(Error::malformed_header("protocol version must be 1"));
    }

    let body_length: u32 = read_frame(buf, base, endianness)?;
    if body_length > MAX_BODY_LENGTH {
        return Err(Error::malformed_header("body length exceeds the maximum allowed length"));
    }

    let raw_serial: u32 = read_frame(buf, base, endianness)?;
    let serial = NonZeroU32::new(raw_serial)
        .ok_or_else(|| Error::malformed_header("serial must be nonzero"))?;

    let header_array = read_value(buf, base, endianness, header_fields_signature())?;
    let mut fields = HeaderFields::from_array(header_array)?;

    // The body begins at the next 8-byte boundary after the header array,
    // mandatory even when the array and/or body are empty.
    buf.align(base, 8)?;

    let body_length = body_length as usize;

    if buf.remaining() < body_length {
        return Err(Error::need_more());
    }

    let body_base = buf.position();
    let body_end = body_base + body_length;

    let mut body = Vec::new();

    match &fields.signature {
        Some(signature) => {
            for component in signature.split() {
                body.push(read_value(buf, body_base, endianness, component)?);
            }

            if buf.position() != body_end {
                return Err(Error::invalid_encoding(
                    "body signature does not account for the full body length",
                ));
            }
        }
        None if body_length != 0 => {
            return Err(Error::invalid_encoding(
                "non-empty body without a Signature header field",
            ));
        }
        None => {}
    }

    let signature = fields.signature.clone();
    let kind = fields.into_kind(message_type)?;

    // `into_kind` took whichever fields it needed for the kind it built
    // (e.g. `interface` for a `Signal`, leaving it `None` here); what is
    // left over is purely optional decoration shared across every kind.
    let interface = fields.interface.take();
    let destination = fields.destination.take();
    let sender = fields.sender.take();
    let unix_fds = fields.unix_fds;

    Ok(DBusMessage {
        endianness,
        kind,
        flags,
        serial,
        interface,
        destination,
        sender,
        unix_fds,
        signature,
        body,
    })
}
