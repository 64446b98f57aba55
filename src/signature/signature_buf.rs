use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use super::{validate, Signature, SignatureError};

/// A validated, owned D-Bus type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBuf(Vec<u8>);

impl SignatureBuf {
    /// Construct a new, empty signature.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Try to construct a new owned signature, validating it first.
    pub fn new<S>(signature: S) -> Result<Self, SignatureError>
    where
        S: Into<Vec<u8>>,
    {
        let signature = signature.into();
        validate(&signature)?;
        Ok(Self(signature))
    }

    /// Construct a signature from raw bytes without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the bytes form a valid signature.
    pub(crate) unsafe fn from_vec_unchecked(signature: Vec<u8>) -> Self {
        Self(signature)
    }

    fn to_signature(&self) -> &Signature {
        // SAFETY: this type ensures during construction that it holds a
        // valid signature.
        unsafe { Signature::new_unchecked(&self.0) }
    }
}

impl Deref for SignatureBuf {
    type Target = Signature;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.to_signature()
    }
}

impl Borrow<Signature> for SignatureBuf {
    #[inline]
    fn borrow(&self) -> &Signature {
        self
    }
}

impl AsRef<Signature> for SignatureBuf {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl fmt::Display for SignatureBuf {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_signature().fmt(f)
    }
}

impl PartialEq<Signature> for SignatureBuf {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<SignatureBuf> for Signature {
    #[inline]
    fn eq(&self, other: &SignatureBuf) -> bool {
        self.as_bytes() == other.0
    }
}
