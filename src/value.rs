//! The recursive value reader and writer: every D-Bus value, from a single
//! byte to a nested struct of arrays of dict-entries, goes through
//! [`read_value`]/[`write_value`] dispatching on a [`Signature`].

use crate::buf::{padding_to, read_frame, ByteBuffer, MAX_ARRAY_LENGTH};
use crate::error::{Error, Result};
use crate::object_path::OwnedObjectPath;
use crate::protocol::Endianness;
use crate::signature::{Signature, SignatureBuf};


/// A fully decoded D-Bus value.
///
/// A closed sum over the D-Bus type system: every case here corresponds to
/// exactly one signature character (or, for [`Struct`][Self::Struct] and
/// [`Dict`][Self::Dict], one bracketed group).
#[derive(Debug, Clone, PartialEq)]
pub enum DBusValue {
    Byte(u8),
    Boolean(bool),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(String),
    ObjectPath(OwnedObjectPath),
    Signature(SignatureBuf),
    Variant(Box<Variant>),
    Struct(Vec<DBusValue>),
    Array(Vec<DBusValue>),
    Dict(Vec<(DBusValue, DBusValue)>),
    UnixFd(u32),
}

/// A self-describing value: a signature paired with the value it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub signature: SignatureBuf,
    pub value: DBusValue,
}

/// Read one value out of `buf` per `sig`, aligning as needed relative to
/// `base` (the start of the enclosing message body).
///
/// On `Err` that is [`Error::is_need_more`], the buffer's read cursor is
/// left wherever it happened to be when data ran out — callers must roll
/// back to their own savepoint, they must not retry in place.
pub(crate) fn read_value(
    buf: &mut ByteBuffer,
    base: usize,
    endianness: Endianness,
    sig: &Signature,
) -> Result<DBusValue> {
    buf.align(base, sig.alignment_of())?;

    let head = sig.as_bytes()[0];

    Ok(match head {
        b'y' => DBusValue::Byte(read_frame(buf, base, endianness)?),
        b'b' => {
            let raw: u32 = read_frame(buf, base, endianness)?;
            match raw {
                0 => DBusValue::Boolean(false),
                1 => DBusValue::Boolean(true),
                _ => return Err(Error::invalid_encoding("boolean value must be 0 or 1")),
            }
        }
        b'n' => DBusValue::Int16(read_frame(buf, base, endianness)?),
        b'q' => DBusValue::Uint16(read_frame(buf, base, endianness)?),
        b'i' => DBusValue::Int32(read_frame(buf, base, endianness)?),
        b'u' => DBusValue::Uint32(read_frame(buf, base, endianness)?),
        b'x' => DBusValue::Int64(read_frame(buf, base, endianness)?),
        b't' => DBusValue::Uint64(read_frame(buf, base, endianness)?),
        b'd' => DBusValue::Double(read_frame(buf, base, endianness)?),
        b'h' => DBusValue::UnixFd(read_frame(buf, base, endianness)?),
        b's' => DBusValue::String(read_string(buf, base, endianness)?),
        b'o' => {
            let string = read_string(buf, base, endianness)?;
            DBusValue::ObjectPath(OwnedObjectPath::new(string)?)
        }
        b'g' => DBusValue::Signature(read_signature(buf)?),
        b'v' => {
            let signature = read_signature(buf)?;
            let value = read_value(buf, base, endianness, &signature)?;
            DBusValue::Variant(Box::new(Variant { signature, value }))
        }
        b'(' => {
            let mut fields = Vec::new();

            for field_sig in sig.struct_fields().split() {
                fields.push(read_value(buf, base, endianness, field_sig)?);
            }

            DBusValue::Struct(fields)
        }
        b'a' => read_array(buf, base, endianness, sig)?,
        _ => return Err(Error::invalid_encoding("unexpected type code in signature")),
    })
}

fn read_string(buf: &mut ByteBuffer, base: usize, endianness: Endianness) -> Result<String> {
    let len: u32 = read_frame(buf, base, endianness)?;
    let bytes = buf.take(len as usize)?;

    if bytes.contains(&0) {
        return Err(Error::invalid_encoding("string contains an embedded NUL"));
    }

    let string = std::str::from_utf8(bytes)
        .map_err(|_| Error::invalid_encoding("string is not valid UTF-8"))?
        .to_owned();

    if buf.take(1)? != [0] {
        return Err(Error::invalid_encoding("string is missing its NUL terminator"));
    }

    Ok(string)
}

fn read_signature(buf: &mut ByteBuffer) -> Result<SignatureBuf> {
    let len: u8 = buf.take(1)?[0];
    let bytes = buf.take(len as usize)?;
    let signature = Signature::new(bytes)?.to_owned();

    if buf.take(1)? != [0] {
        return Err(Error::invalid_encoding(
            "signature is missing its NUL terminator",
        ));
    }

    Ok(signature)
}

fn read_array(
    buf: &mut ByteBuffer,
    base: usize,
    endianness: Endianness,
    sig: &Signature,
) -> Result<DBusValue> {
    let len: u32 = read_frame(buf, base, endianness)?;

    if len > MAX_ARRAY_LENGTH {
        return Err(Error::invalid_encoding("array longer than the maximum allowed length"));
    }

    let element_sig = sig.array_element();
    // Mandatory even for an empty array.
    buf.align(base, element_sig.alignment_of())?;

    let end = buf.position() + len as usize;

    if element_sig.as_bytes().first() == Some(&b'{') {
        let (key_sig, value_sig) = element_sig.dict_entry_fields();
        let mut entries = Vec::new();

        while buf.position() < end {
            buf.align(base, 8)?;
            let key = read_value(buf, base, endianness, key_sig)?;
            let value = read_value(buf, base, endianness, value_sig)?;
            entries.push((key, value));
        }

        if buf.position() != end {
            return Err(Error::invalid_encoding(
                "array byte length overshoots the body end",
            ));
        }

        Ok(DBusValue::Dict(entries))
    } else {
        let mut elements = Vec::new();

        while buf.position() < end {
            elements.push(read_value(buf, base, endianness, element_sig)?);
        }

        if buf.position() != end {
            return Err(Error::invalid_encoding(
                "array byte length overshoots the body end",
            ));
        }

        Ok(DBusValue::Array(elements))
    }
}

/// Pad `out` with NUL bytes until `out.len() - base` is a multiple of
/// `boundary`.
pub(crate) fn align_out(out: &mut Vec<u8>, base: usize, boundary: usize) {
    let padding = padding_to(base, out.len(), boundary);
    out.resize(out.len() + padding, 0);
}

/// Write one value into `out` per `sig`, mirroring [`read_value`] exactly.
pub(crate) fn write_value(out: &mut Vec<u8>, endianness: Endianness, base: usize, value: &DBusValue, sig: &Signature) {
    align_out(out, base, sig.alignment_of());

    match value {
        DBusValue::Byte(v) => write_frame(out, endianness, *v),
        DBusValue::Boolean(v) => write_frame(out, endianness, *v as u32),
        DBusValue::Int16(v) => write_frame(out, endianness, *v),
        DBusValue::Uint16(v) => write_frame(out, endianness, *v),
        DBusValue::Int32(v) => write_frame(out, endianness, *v),
        DBusValue::Uint32(v) => write_frame(out, endianness, *v),
        DBusValue::Int64(v) => write_frame(out, endianness, *v),
        DBusValue::Uint64(v) => write_frame(out, endianness, *v),
        DBusValue::Double(v) => write_frame(out, endianness, *v),
        DBusValue::UnixFd(v) => write_frame(out, endianness, *v),
        DBusValue::String(v) => write_string(out, endianness, v.as_bytes()),
        DBusValue::ObjectPath(v) => write_string(out, endianness, v.as_str().as_bytes()),
        DBusValue::Signature(v) => write_signature(out, v.as_bytes()),
        DBusValue::Variant(v) => {
            write_signature(out, v.signature.as_bytes());
            write_value(out, endianness, base, &v.value, &v.signature);
        }
        DBusValue::Struct(fields) => {
            for (field, field_sig) in fields.iter().zip(sig.struct_fields().split()) {
                write_value(out, endianness, base, field, field_sig);
            }
        }
        DBusValue::Array(elements) => {
            let element_sig = sig.array_element();
            write_array_body(out, endianness, base, element_sig, |out, base| {
                for element in elements {
                    write_value(out, endianness, base, element, element_sig);
                }
            });
        }
        DBusValue::Dict(entries) => {
            let element_sig = sig.array_element();
            let (key_sig, value_sig) = element_sig.dict_entry_fields();
            write_array_body(out, endianness, base, element_sig, |out, base| {
                for (key, value) in entries {
                    align_out(out, base, 8);
                    write_value(out, endianness, base, key, key_sig);
                    write_value(out, endianness, base, value, value_sig);
                }
            });
        }
    }
}

/// Write an array/dict length-prefixed body.
///
/// Alignment is always measured from the start of the message body, never
/// reset at a container boundary, so `base` is threaded through unchanged;
/// only the byte range used to compute the length prefix is local.
fn write_array_body(
    out: &mut Vec<u8>,
    endianness: Endianness,
    base: usize,
    element_sig: &Signature,
    fill: impl FnOnce(&mut Vec<u8>, usize),
) {
    // Placeholder length, patched once the content is known.
    let len_at = out.len();
    write_frame(out, endianness, 0u32);
    align_out(out, base, element_sig.alignment_of());

    let content_start = out.len();
    fill(out, base);

    let content_len = (out.len() - content_start) as u32;
    let patched = match endianness {
        Endianness::LITTLE => content_len.to_le_bytes(),
        Endianness::BIG => content_len.to_be_bytes(),
        _ => unreachable!("endianness is always l or B"),
    };
    out[len_at..len_at + 4].copy_from_slice(&patched);
}

fn write_string(out: &mut Vec<u8>, endianness: Endianness, bytes: &[u8]) {
    write_frame(out, endianness, bytes.len() as u32);
    out.extend_from_slice(bytes);
    out.push(0);
}

fn write_signature(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    out.push(0);
}

pub(crate) fn write_frame<T: crate::frame::Frame>(out: &mut Vec<u8>, endianness: Endianness, value: T) {
    value.write_bytes(endianness, out);
}
