use crate::buf::padding_to;
use crate::error::{Error, Result};

/// A savepoint into a [`ByteBuffer`]'s read cursor.
///
/// Obtained from [`ByteBuffer::mark`] and consumed by
/// [`ByteBuffer::reset_to`] to transactionally abandon a partial read
/// without losing any already-appended bytes.
#[derive(Debug, Clone, Copy)]
pub struct Mark(usize);

impl Mark {
    /// The buffer offset this mark was taken at.
    #[inline]
    pub(crate) fn offset(self) -> usize {
        self.0
    }
}

/// A growable byte window with a read cursor.
///
/// Bytes are appended at the tail (as they arrive off the transport) and
/// consumed from the head as they are parsed. [`compact`] discards
/// already-consumed bytes so memory use stays bounded by roughly one
/// in-flight message, and [`mark`]/[`reset_to`] let a caller abandon a
/// partial parse with zero side effects.
///
/// [`compact`]: Self::compact
/// [`mark`]: Self::mark
/// [`reset_to`]: Self::reset_to
#[derive(Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read: usize,
}

impl ByteBuffer {
    /// Construct a new, empty buffer.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            read: 0,
        }
    }

    /// Append bytes at the tail of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// The number of unconsumed bytes remaining in the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read
    }

    /// The absolute read cursor position. Resets to `0` on every
    /// [`compact`][Self::compact].
    #[inline]
    pub fn position(&self) -> usize {
        self.read
    }

    /// Peek at the next `n` unconsumed bytes without advancing the cursor.
    ///
    /// Returns `None` (not an error) if fewer than `n` bytes are currently
    /// buffered; callers in this crate translate that into [`Error::need_more`].
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        if n > self.remaining() {
            return None;
        }

        Some(&self.data[self.read..self.read + n])
    }

    /// Advance the read cursor by `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`remaining`][Self::remaining]. Callers must
    /// always check availability (via [`peek`][Self::peek] or
    /// [`take`][Self::take]) before consuming.
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.remaining(), "consume past buffer tail");
        self.read += n;
    }

    /// Peek and consume `n` bytes in one step.
    pub(crate) fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.remaining() {
            return Err(Error::need_more());
        }

        let start = self.read;
        self.read += n;
        Ok(&self.data[start..start + n])
    }

    /// Take a savepoint of the current read cursor.
    #[inline]
    pub fn mark(&self) -> Mark {
        Mark(self.read)
    }

    /// Roll the read cursor back to a previously taken savepoint.
    ///
    /// No bytes are discarded from the buffer; this only rewinds the
    /// cursor.
    #[inline]
    pub fn reset_to(&mut self, mark: Mark) {
        self.read = mark.0;
    }

    /// Advance the cursor to the next multiple of `boundary`, counted from
    /// `base` (typically the start of the current message or message body).
    ///
    /// Padding bytes are skipped without being validated as NUL, per the
    /// wire format's lenient-on-read policy. Fails with
    /// [`Error::need_more`] (and leaves the cursor untouched) if not enough
    /// bytes are buffered to reach the boundary.
    pub fn align(&mut self, base: usize, boundary: usize) -> Result<()> {
        let padding = padding_to(base, self.read, boundary);

        if padding == 0 {
            return Ok(());
        }

        if padding > self.remaining() {
            return Err(Error::need_more());
        }

        self.read += padding;
        Ok(())
    }

    /// Borrow the entire unconsumed region of the buffer.
    ///
    /// Used by the line reader to scan for a `CR LF` terminator without
    /// knowing its length up front.
    #[inline]
    pub(crate) fn remaining_slice(&self) -> &[u8] {
        &self.data[self.read..]
    }

    /// Discard all bytes up to the read cursor, resetting it to `0`.
    ///
    /// Called once per emitted message so resident memory stays bounded by
    /// roughly one in-flight message rather than growing for the lifetime
    /// of the session.
    pub fn compact(&mut self) {
        if self.read == 0 {
            return;
        }

        self.data.drain(..self.read);
        self.read = 0;
    }
}
