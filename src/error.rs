use std::error;
use std::fmt;
use std::io;
use std::str::Utf8Error;

use crate::object_path::ObjectPathError;
use crate::signature::SignatureError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised by this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Self { kind }
    }

    /// Test if this error merely signals that more data is needed.
    ///
    /// Readers never construct this variant directly; it is used internally
    /// by buffer primitives and is always translated into `Ok(None)` by the
    /// time it reaches a caller of [`MessageReader::try_read`] or
    /// [`StreamDriver::feed`].
    ///
    /// [`MessageReader::try_read`]: crate::message::MessageReader::try_read
    /// [`StreamDriver::feed`]: crate::driver::StreamDriver::feed
    #[inline]
    pub(crate) fn is_need_more(&self) -> bool {
        matches!(self.kind, ErrorKind::NeedMore)
    }
}

impl From<SignatureError> for Error {
    #[inline]
    fn from(error: SignatureError) -> Self {
        Self::new(ErrorKind::Signature(error))
    }
}

impl From<ObjectPathError> for Error {
    #[inline]
    fn from(_: ObjectPathError) -> Self {
        Self::new(ErrorKind::InvalidEncoding("invalid object path"))
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(error: io::Error) -> Self {
        Self::new(ErrorKind::Io(error))
    }
}

impl From<Utf8Error> for Error {
    #[inline]
    fn from(error: Utf8Error) -> Self {
        Self::new(ErrorKind::Utf8Error(error))
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io(error) => error.fmt(f),
            ErrorKind::Signature(error) => error.fmt(f),
            ErrorKind::Utf8Error(error) => error.fmt(f),
            ErrorKind::NeedMore => write!(f, "need more data"),
            ErrorKind::MalformedHeader(reason) => write!(f, "malformed header: {reason}"),
            ErrorKind::InvalidEncoding(reason) => write!(f, "invalid encoding: {reason}"),
            ErrorKind::AuthFailure(reason) => write!(f, "SASL auth failure: {reason}"),
            ErrorKind::TransportClosed => write!(f, "transport closed mid-message"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(error) => Some(error),
            ErrorKind::Signature(error) => Some(error),
            ErrorKind::Utf8Error(error) => Some(error),
            _ => None,
        }
    }
}

/// The specific kind of error that occurred.
///
/// [`NeedMore`] is not surfaced as an [`Error`] to public callers — it is
/// caught at the [`MessageReader`]/[`StreamDriver`] boundary and converted
/// into `Ok(None)` / a suspended read. It exists as a variant here purely so
/// that low-level buffer primitives can use `?` like any other fallible
/// operation.
///
/// [`NeedMore`]: ErrorKind::NeedMore
/// [`MessageReader`]: crate::message::MessageReader
/// [`StreamDriver`]: crate::driver::StreamDriver
#[derive(Debug)]
pub(crate) enum ErrorKind {
    Io(io::Error),
    Signature(SignatureError),
    Utf8Error(Utf8Error),
    /// Not enough bytes are buffered yet to complete the current read.
    NeedMore,
    MalformedHeader(&'static str),
    InvalidEncoding(&'static str),
    AuthFailure(&'static str),
    TransportClosed,
}

impl Error {
    #[inline]
    pub(crate) fn need_more() -> Error {
        Error::new(ErrorKind::NeedMore)
    }

    #[inline]
    pub(crate) fn malformed_header(reason: &'static str) -> Error {
        Error::new(ErrorKind::MalformedHeader(reason))
    }

    #[inline]
    pub(crate) fn invalid_encoding(reason: &'static str) -> Error {
        Error::new(ErrorKind::InvalidEncoding(reason))
    }

    #[inline]
    pub(crate) fn auth_failure(reason: &'static str) -> Error {
        Error::new(ErrorKind::AuthFailure(reason))
    }

    #[inline]
    pub(crate) fn transport_closed() -> Error {
        Error::new(ErrorKind::TransportClosed)
    }
}
