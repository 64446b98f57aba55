use std::mem::size_of;
use std::str::from_utf8;

use crate::buf::ByteBuffer;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::protocol::Endianness;

/// Read a fixed-width [`Frame`] value, aligning to its own size first.
///
/// `base` is the offset (within the buffer) that alignment is measured
/// from — the start of the current message for header reads, the start of
/// the message body for value reads.
pub(crate) fn read_frame<T>(buf: &mut ByteBuffer, base: usize, endianness: Endianness) -> Result<T>
where
    T: Frame,
{
    let width = size_of::<T>();
    buf.align(base, width)?;
    let bytes = buf.take(width)?;
    Ok(T::from_bytes(bytes, endianness))
}

/// Scan the buffer for a `CR LF`-terminated ASCII line and return it
/// decoded as UTF-8, consuming the line and its terminator.
///
/// Yields [`Error::need_more`] until a full `CR LF` sequence is found;
/// the buffer is left untouched in that case.
pub(crate) fn read_line(buf: &mut ByteBuffer) -> Result<String> {
    let haystack = buf.remaining_slice();

    let Some(at) = haystack.windows(2).position(|w| w == b"\r\n") else {
        return Err(Error::need_more());
    };

    let line = from_utf8(&haystack[..at])
        .map_err(|_| Error::invalid_encoding("auth line is not valid UTF-8"))?
        .to_owned();

    buf.consume(at + 2);
    Ok(line)
}
