//! The two-phase stream driver: textual AUTH negotiation, then binary
//! D-Bus messages, fed from arbitrarily-sized chunks via [`feed`].
//!
//! [`feed`]: StreamDriver::feed

use std::fmt;

use crate::buf::{read_line, ByteBuffer};
use crate::error::{Error, Result};
use crate::message::{DBusMessage, MessageReader};
use crate::sasl::ServerLine;

/// An event emitted by [`StreamDriver::feed`].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// A line received during the AUTH phase, verbatim (without its CR LF).
    AuthLine(String),
    /// A fully decoded message, received during the Binary phase.
    Message(DBusMessage),
    /// The session has ended — either the driver hit a fatal decode error,
    /// or (in a future version) the transport signalled end-of-stream. No
    /// further bytes are processed once this is emitted.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Auth,
    Binary,
    Failed,
}

/// Returned by [`StreamDriver::feed`] on a fatal decode error.
///
/// Carries both the underlying error and whatever events had already been
/// decoded earlier in the same `feed` call, so a message that was
/// successfully parsed (and compacted out of the buffer) before a later
/// malformed message in the same chunk is never silently dropped.
#[derive(Debug)]
pub struct FeedError {
    /// Events decoded before the failure, in order. Always ends with
    /// [`DriverEvent::Closed`].
    pub events: Vec<DriverEvent>,
    pub error: Error,
}

impl FeedError {
    pub(crate) fn is_need_more(&self) -> bool {
        self.error.is_need_more()
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Drives a single D-Bus connection's byte stream through the AUTH phase
/// and then into a sequence of decoded messages.
///
/// Owns the receive buffer for the whole session. Not internally
/// synchronized — concurrent `feed` calls on one instance are undefined;
/// confine a single [`StreamDriver`] to one task.
#[derive(Debug)]
pub struct StreamDriver {
    buf: ByteBuffer,
    state: DriverState,
    /// Set once an `OK <guid>` line has been seen. Since this driver only
    /// ever decodes the *incoming* half of the connection, the client's own
    /// `BEGIN\r\n` (which is what actually ends the AUTH phase per the
    /// D-Bus spec) never appears on this stream — so a successful `OK` is
    /// taken as the signal that the local side is about to begin, and the
    /// next `read_line` failure (no further CR LF found) flips the driver
    /// into the Binary phase rather than waiting forever for text that
    /// will never arrive. A literal `BEGIN` line is still honored directly,
    /// for the (reversed) case where this driver decodes the client's own
    /// outgoing stream instead.
    authenticated: bool,
}

impl StreamDriver {
    /// Construct a new driver, starting in the AUTH phase.
    pub fn new() -> Self {
        Self {
            buf: ByteBuffer::new(),
            state: DriverState::Auth,
            authenticated: false,
        }
    }

    /// Feed a chunk of bytes (of any size, split on any boundary) into the
    /// driver, returning the events it was able to produce.
    ///
    /// Once a fatal error has closed the session, further calls are no-ops
    /// that just report [`DriverEvent::Closed`] again.
    ///
    /// A fatal error does not discard events already decoded earlier in the
    /// same call: [`FeedError::events`] carries whatever was collected
    /// before the failing message, so a good message followed by a bad one
    /// in the same chunk still reaches the caller.
    pub fn feed(&mut self, bytes: &[u8]) -> std::result::Result<Vec<DriverEvent>, FeedError> {
        if self.state == DriverState::Failed {
            return Ok(vec![DriverEvent::Closed]);
        }

        self.buf.append(bytes);
        let mut events = Vec::new();

        if self.state == DriverState::Auth {
            if let Err(error) = self.drain_auth(&mut events) {
                self.fail(&mut events);
                return Err(FeedError { events, error });
            }
        }

        if self.state == DriverState::Binary {
            if let Err(error) = self.drain_binary(&mut events) {
                self.fail(&mut events);
                return Err(FeedError { events, error });
            }
        }

        Ok(events)
    }

    fn drain_auth(&mut self, events: &mut Vec<DriverEvent>) -> Result<()> {
        loop {
            match read_line(&mut self.buf) {
                Ok(line) => {
                    tracing::trace!(line = %line, "sasl: received line");

                    if line == "BEGIN" {
                        events.push(DriverEvent::AuthLine(line));
                        self.state = DriverState::Binary;
                        return Ok(());
                    }

                    if let Ok(ServerLine::Ok { .. }) = ServerLine::parse(&line) {
                        self.authenticated = true;
                    }

                    events.push(DriverEvent::AuthLine(line));
                }
                Err(error) if error.is_need_more() => {
                    if self.authenticated {
                        tracing::debug!("sasl: authenticated, switching to the binary phase");
                        self.state = DriverState::Binary;
                    }

                    return Ok(());
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn drain_binary(&mut self, events: &mut Vec<DriverEvent>) -> Result<()> {
        loop {
            match MessageReader::try_read(&mut self.buf) {
                Ok(Some(message)) => {
                    tracing::trace!(serial = message.serial.get(), "decoded a message");
                    events.push(DriverEvent::Message(message));
                    self.buf.compact();
                }
                Ok(None) => return Ok(()),
                Err(error) => return Err(error),
            }
        }
    }

    /// Signal that the upstream transport has reached end-of-stream.
    ///
    /// A clean close — nothing left buffered, i.e. no AUTH line or message
    /// was partway through being read — is not an error: the session simply
    /// ends and `Ok(vec![DriverEvent::Closed])` is returned. Bytes left
    /// over mid-line or mid-message are `Err(TransportClosed)`, and the
    /// driver transitions to `Failed` like any other fatal error.
    ///
    /// Idempotent: calling this again after the session has already ended
    /// (by this or any other fatal error) just reports `Closed` again.
    pub fn end_of_stream(&mut self) -> Result<Vec<DriverEvent>> {
        if self.state == DriverState::Failed {
            return Ok(vec![DriverEvent::Closed]);
        }

        if self.buf.remaining() > 0 {
            let mut events = Vec::new();
            self.fail(&mut events);
            return Err(Error::transport_closed());
        }

        self.state = DriverState::Failed;
        self.buf = ByteBuffer::new();
        Ok(vec![DriverEvent::Closed])
    }

    fn fail(&mut self, events: &mut Vec<DriverEvent>) {
        tracing::error!("stream driver hit a fatal decode error, closing the session");
        self.state = DriverState::Failed;
        // A cancelled session drops its buffer.
        self.buf = ByteBuffer::new();
        events.push(DriverEvent::Closed);
    }
}

impl Default for StreamDriver {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
