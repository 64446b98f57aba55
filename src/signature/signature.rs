use std::fmt;
use std::str::from_utf8_unchecked;

use crate::protocol::Type;

use super::{validate, SignatureBuf, SignatureError};

/// A validated D-Bus type signature.
///
/// # Examples
///
/// ```
/// use dbus_codec::signature::Signature;
///
/// assert!(Signature::new(b"aai").is_ok());
/// assert!(Signature::new(b"(a)").is_err());
/// ```
#[derive(Debug, Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct Signature([u8]);

impl Signature {
    /// The empty signature.
    pub const EMPTY: &'static Signature = Signature::new_unvalidated(b"");
    pub const BYTE: &'static Signature = Signature::new_unvalidated(b"y");
    pub const BOOLEAN: &'static Signature = Signature::new_unvalidated(b"b");
    pub const INT16: &'static Signature = Signature::new_unvalidated(b"n");
    pub const UINT16: &'static Signature = Signature::new_unvalidated(b"q");
    pub const INT32: &'static Signature = Signature::new_unvalidated(b"i");
    pub const UINT32: &'static Signature = Signature::new_unvalidated(b"u");
    pub const INT64: &'static Signature = Signature::new_unvalidated(b"x");
    pub const UINT64: &'static Signature = Signature::new_unvalidated(b"t");
    pub const DOUBLE: &'static Signature = Signature::new_unvalidated(b"d");
    pub const STRING: &'static Signature = Signature::new_unvalidated(b"s");
    pub const OBJECT_PATH: &'static Signature = Signature::new_unvalidated(b"o");
    pub const SIGNATURE: &'static Signature = Signature::new_unvalidated(b"g");
    pub const VARIANT: &'static Signature = Signature::new_unvalidated(b"v");
    pub const UNIX_FD: &'static Signature = Signature::new_unvalidated(b"h");

    /// Try to construct a new signature, validating it first.
    pub fn new<S>(signature: &S) -> Result<&Signature, SignatureError>
    where
        S: ?Sized + AsRef<[u8]>,
    {
        let signature = signature.as_ref();
        validate(signature)?;
        // SAFETY: just validated above, and the byte slice is
        // repr(transparent) over this type.
        unsafe { Ok(Self::new_unchecked(signature)) }
    }

    /// Construct a new signature without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the bytes form a valid signature.
    pub(crate) const unsafe fn new_unchecked(signature: &[u8]) -> &Self {
        &*(signature as *const [u8] as *const Signature)
    }

    const fn new_unvalidated(signature: &'static [u8]) -> &'static Self {
        // SAFETY: all constants above are valid single-character signatures.
        unsafe { &*(signature as *const [u8] as *const Signature) }
    }

    /// Test if the signature is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length of the signature in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow this signature as a string.
    pub fn as_str(&self) -> &str {
        // SAFETY: validation indirectly ensures the signature is valid UTF-8.
        unsafe { from_utf8_unchecked(&self.0) }
    }

    /// Borrow this signature as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Split this signature into its top-level sequence of complete types.
    ///
    /// `"yvs"` splits into `[y, v, s]`; `"(yv)s"` splits into `[(yv), s]`.
    /// Each yielded [`Signature`] is itself a single complete type, which
    /// may recursively contain further complete types.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_codec::signature::Signature;
    ///
    /// let parts: Vec<_> = Signature::new(b"(yv)s").unwrap().split().map(Signature::as_str).collect();
    /// assert_eq!(parts, ["(yv)", "s"]);
    /// ```
    pub fn split(&self) -> Split<'_> {
        Split { rest: &self.0 }
    }

    /// The alignment (in bytes) of the first top-level type in this
    /// signature: `y`/`g`/`v`=1, `n`/`q`=2, `i`/`u`/`b`/`h`/`a`=4,
    /// `x`/`t`/`d`/`(`=8, `s`/`o`=4.
    ///
    /// # Panics
    ///
    /// Panics if the signature is empty or begins with an unknown type
    /// code; both are excluded by [`validate`][Self::new].
    pub fn alignment_of(&self) -> usize {
        match self.0.first().copied().map(Type) {
            Some(Type::BYTE) | Some(Type::SIGNATURE) | Some(Type::VARIANT) => 1,
            Some(Type::INT16) | Some(Type::UINT16) => 2,
            Some(Type::INT32)
            | Some(Type::UINT32)
            | Some(Type::BOOLEAN)
            | Some(Type::UNIX_FD)
            | Some(Type::ARRAY) => 4,
            Some(Type::INT64)
            | Some(Type::UINT64)
            | Some(Type::DOUBLE)
            | Some(Type::OPEN_PAREN)
            | Some(Type::OPEN_BRACE) => 8,
            Some(Type::STRING) | Some(Type::OBJECT_PATH) => 4,
            _ => panic!("alignment_of called on an invalid signature"),
        }
    }

    /// If this signature's first type is `a` (an array), return the
    /// signature of its element type.
    pub(crate) fn array_element(&self) -> &Signature {
        debug_assert_eq!(self.0.first().copied(), Some(b'a'));
        next_complete_type(&self.0[1..])
    }

    /// If this signature's first type is `(...)`, return the inner
    /// signature between the parens.
    pub(crate) fn struct_fields(&self) -> &Signature {
        debug_assert_eq!(self.0.first().copied(), Some(b'('));
        let inner = &self.0[1..self.0.len() - 1];
        // SAFETY: derived from an already-validated signature.
        unsafe { Signature::new_unchecked(inner) }
    }

    /// If this signature's first type is `{kv}` (a dict-entry), return the
    /// key and value signatures.
    pub(crate) fn dict_entry_fields(&self) -> (&Signature, &Signature) {
        debug_assert_eq!(self.0.first().copied(), Some(b'{'));
        let inner = &self.0[1..self.0.len() - 1];
        let key = next_complete_type(inner);
        let value = next_complete_type(&inner[key.len()..]);
        (key, value)
    }
}

fn next_complete_type(bytes: &[u8]) -> &Signature {
    let mut depth = 0i32;
    let mut n = 0;

    loop {
        let b = bytes[n];
        n += 1;

        match b {
            b'a' => continue,
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth -= 1,
            _ => {}
        }

        if depth == 0 {
            break;
        }
    }

    // SAFETY: derived from an already-validated signature.
    unsafe { Signature::new_unchecked(&bytes[..n]) }
}

/// An iterator over the top-level complete types of a [`Signature`].
///
/// Constructed by [`Signature::split`].
pub struct Split<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Split<'a> {
    type Item = &'a Signature;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let item = next_complete_type(self.rest);
        self.rest = &self.rest[item.len()..];
        Some(item)
    }
}

impl fmt::Display for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<Signature> for Signature {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl PartialEq<[u8]> for Signature {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Signature {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl ToOwned for Signature {
    type Owned = SignatureBuf;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // SAFETY: `self` is already a validated signature.
        unsafe { SignatureBuf::from_vec_unchecked(self.0.to_vec()) }
    }
}
