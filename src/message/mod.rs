//! Parsed D-Bus messages and the reader/writer pair that convert them to
//! and from the wire format.

use std::num::NonZeroU32;

use crate::object_path::OwnedObjectPath;
use crate::protocol::{Endianness, Flags};
use crate::signature::SignatureBuf;
use crate::value::DBusValue;

pub use self::reader::MessageReader;
mod reader;

pub(crate) mod writer;

#[cfg(test)]
mod tests;

/// The type-specific required header fields of a message.
///
/// Fields that are optional regardless of message type (`Interface` on a
/// method call, `Destination`, `Sender`, `UnixFds`) live on [`DBusMessage`]
/// instead, since carrying them here would mean every variant needs to
/// guess which of its siblings' fields it might also want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A method call. Requires `Path` and `Member`.
    MethodCall {
        path: OwnedObjectPath,
        member: String,
    },
    /// A method reply with returned data. Requires `ReplySerial`.
    MethodReturn { reply_serial: NonZeroU32 },
    /// An error reply. Requires `ErrorName` and `ReplySerial`.
    Error {
        error_name: String,
        reply_serial: NonZeroU32,
    },
    /// A signal emission. Requires `Path`, `Interface`, and `Member`.
    Signal {
        path: OwnedObjectPath,
        interface: String,
        member: String,
    },
}

/// A fully decoded D-Bus message: fixed header, header fields, and a body
/// whose element types are given by the `Signature` header field.
#[derive(Debug, Clone, PartialEq)]
pub struct DBusMessage {
    pub endianness: Endianness,
    pub kind: MessageKind,
    pub flags: Flags,
    pub serial: NonZeroU32,
    /// The `Interface` header field. Only ever `Some` as a required value
    /// for [`MessageKind::Signal`] (carried there instead); for other kinds
    /// it is optional decoration, as on a real bus.
    pub interface: Option<String>,
    pub destination: Option<String>,
    pub sender: Option<String>,
    pub unix_fds: Option<u32>,
    /// The `Signature` header field. `None` means the message has an empty
    /// body.
    pub signature: Option<SignatureBuf>,
    /// The decoded body, one [`DBusValue`] per top-level type in
    /// `signature`.
    pub body: Vec<DBusValue>,
}

impl DBusMessage {
    /// The message type byte this message would encode to:
    /// `MethodCall=1, MethodReturn=2, Error=3, Signal=4`.
    pub fn message_type(&self) -> u8 {
        match self.kind {
            MessageKind::MethodCall { .. } => 1,
            MessageKind::MethodReturn { .. } => 2,
            MessageKind::Error { .. } => 3,
            MessageKind::Signal { .. } => 4,
        }
    }
}
