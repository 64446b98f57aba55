use crate::protocol::Endianness;

/// A fixed-width value that can be read directly out of an aligned buffer
/// and byte-swapped in place to correct for the message's endianness.
///
/// Every basic D-Bus type except strings/signatures (which are variable
/// length) implements this.
pub(crate) trait Frame: Copy {
    /// Read this value's bytes out of `bytes` (which must be exactly
    /// `size_of::<Self>()` long) at the given endianness.
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self;

    /// Write this value's bytes into `out` at the given endianness.
    fn write_bytes(self, endianness: Endianness, out: &mut Vec<u8>);
}

impl Frame for u8 {
    #[inline]
    fn from_bytes(bytes: &[u8], _: Endianness) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_bytes(self, _: Endianness, out: &mut Vec<u8>) {
        out.push(self);
    }
}

macro_rules! impl_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Frame for $ty {
                #[inline]
                fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
                    let array = bytes.try_into().expect("incorrect width");

                    match endianness {
                        Endianness::LITTLE => <$ty>::from_le_bytes(array),
                        Endianness::BIG => <$ty>::from_be_bytes(array),
                        _ => unreachable!("endianness is always l or B"),
                    }
                }

                #[inline]
                fn write_bytes(self, endianness: Endianness, out: &mut Vec<u8>) {
                    match endianness {
                        Endianness::LITTLE => out.extend_from_slice(&self.to_le_bytes()),
                        Endianness::BIG => out.extend_from_slice(&self.to_be_bytes()),
                        _ => unreachable!("endianness is always l or B"),
                    }
                }
            }
        )*
    }
}

impl_number!(u16, u32, u64);
impl_number!(i16, i32, i64);

impl Frame for f64 {
    #[inline]
    fn from_bytes(bytes: &[u8], endianness: Endianness) -> Self {
        let bits = u64::from_bytes(bytes, endianness);
        f64::from_bits(bits)
    }

    #[inline]
    fn write_bytes(self, endianness: Endianness, out: &mut Vec<u8>) {
        self.to_bits().write_bytes(endianness, out);
    }
}
