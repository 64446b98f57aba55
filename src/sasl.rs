//! The textual SASL line protocol exchanged before a connection switches
//! into binary D-Bus messages.
//!
//! Producing the auth bytes is in scope; sourcing the credential (the uid)
//! is a separate concern — [`external_from_uid`] is kept as a thin, optional
//! convenience and every caller may instead supply their own uid to
//! [`external_from_u32_ascii_hex`].

use std::fmt;

/// A line sent by the server during the AUTH phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// `OK <guid>` — authentication succeeded.
    Ok { guid: String },
    /// `REJECTED <mechs>` — the attempted mechanism was refused; `mechs` is
    /// the space-separated list of mechanisms the server would accept.
    Rejected { mechs: Vec<String> },
    /// `DATA <hex>` — a SASL challenge/continuation.
    Data { hex: String },
    /// `ERROR [msg]`.
    Error { message: Option<String> },
    /// `AGREE_UNIX_FD` — the server accepts Unix FD passing.
    AgreeUnixFd,
}

impl ServerLine {
    /// Parse a single AUTH-phase line (without its trailing CR LF).
    pub fn parse(line: &str) -> Result<Self, crate::error::Error> {
        let mut parts = line.splitn(2, ' ');
        let command = parts
            .next()
            .ok_or_else(|| crate::error::Error::auth_failure("empty auth line"))?;
        let rest = parts.next();

        Ok(match command {
            "OK" => ServerLine::Ok {
                guid: rest
                    .ok_or_else(|| crate::error::Error::auth_failure("OK is missing a guid"))?
                    .to_owned(),
            },
            "REJECTED" => ServerLine::Rejected {
                mechs: rest
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect(),
            },
            "DATA" => ServerLine::Data {
                hex: rest
                    .ok_or_else(|| crate::error::Error::auth_failure("DATA is missing a payload"))?
                    .to_owned(),
            },
            "ERROR" => ServerLine::Error {
                message: rest.map(str::to_owned),
            },
            "AGREE_UNIX_FD" => ServerLine::AgreeUnixFd,
            _ => return Err(crate::error::Error::auth_failure("unrecognized auth command")),
        })
    }
}

/// A line sent by the client during the AUTH phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLine {
    /// `AUTH EXTERNAL <hex>`.
    AuthExternal { hex: String },
    /// `NEGOTIATE_UNIX_FD`.
    NegotiateUnixFd,
    /// `BEGIN`, after which no further text is valid on the stream.
    Begin,
}

impl fmt::Display for ClientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientLine::AuthExternal { hex } => write!(f, "AUTH EXTERNAL {hex}"),
            ClientLine::NegotiateUnixFd => write!(f, "NEGOTIATE_UNIX_FD"),
            ClientLine::Begin => write!(f, "BEGIN"),
        }
    }
}

impl ClientLine {
    /// Render this line with its CR LF terminator, ready to append to the
    /// outgoing transport buffer.
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }
}

/// The single leading NUL byte the client must send before its first AUTH
/// line.
pub const LEADING_NUL: u8 = 0;

/// Hex-encode `id`'s ASCII decimal representation, the payload format SASL
/// `EXTERNAL` authentication uses to convey a uid.
///
/// For example, uid `1000` becomes the ASCII text `"1000"`, which is then
/// hex-encoded byte-by-byte into `"31303030"`.
pub fn external_from_u32_ascii_hex(mut id: u32) -> String {
    const HEX: [u8; 16] = *b"0123456789abcdef";

    let mut decimal = [0u8; 10];
    let mut n = 0;

    if id == 0 {
        decimal[0] = b'0';
        n = 1;
    } else {
        while id > 0 {
            decimal[n] = b'0' + (id % 10) as u8;
            n += 1;
            id /= 10;
        }

        decimal[..n].reverse();
    }

    let mut hex = String::with_capacity(n * 2);

    for &byte in &decimal[..n] {
        hex.push(HEX[(byte >> 4) as usize] as char);
        hex.push(HEX[(byte & 0xf) as usize] as char);
    }

    hex
}

/// Construct an `AUTH EXTERNAL` client line from the calling process's own
/// uid.
///
/// Gated on the optional `libc` feature. Callers that source the uid some
/// other way (a test, a different credential store) remain free to call
/// [`external_from_u32_ascii_hex`] directly.
#[cfg(all(unix, feature = "libc"))]
pub fn external_from_uid() -> ClientLine {
    let uid = unsafe { libc::getuid() };
    ClientLine::AuthExternal {
        hex: external_from_u32_ascii_hex(uid),
    }
}

#[cfg(test)]
mod tests;
