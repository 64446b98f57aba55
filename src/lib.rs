//! An incremental D-Bus wire-format codec.
//!
//! This crate decodes an unbounded byte stream, arriving in arbitrarily
//! sized chunks off a transport such as a Unix domain socket, into a
//! sequence of fully parsed [`DBusMessage`]s — and provides the matching
//! encoder so the two can be round-tripped and tested against each other.
//!
//! The socket transport itself, a high-level client that routes replies to
//! callers and dispatches signals, object-proxy conveniences,
//! introspection XML, and bus-address/credential resolution are all
//! external collaborators and out of scope here; see [`StreamDriver`] for
//! where a transport hands this crate its bytes.

#[doc(inline)]
pub use self::error::{Error, Result};
mod error;

#[doc(inline)]
pub use self::protocol::{Endianness, Flags};
pub mod protocol;

mod frame;

#[doc(inline)]
pub use self::buf::{ByteBuffer, Mark};
mod buf;

pub mod signature;

pub mod object_path;

#[doc(inline)]
pub use self::value::{DBusValue, Variant};
mod value;

#[doc(inline)]
pub use self::message::{writer::encode_message, DBusMessage, MessageKind, MessageReader};
mod message;

pub mod sasl;

#[doc(inline)]
pub use self::driver::{DriverEvent, FeedError, StreamDriver};
mod driver;

#[cfg(test)]
mod tests;
