use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use super::{validate, ObjectPath, ObjectPathError};

/// A validated, owned object path.
///
/// See [`ObjectPath`] for the grammar this enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct OwnedObjectPath(String);

impl OwnedObjectPath {
    /// Construct an owned object path from its raw underlying string.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the string contains a valid object path.
    #[inline]
    pub(super) unsafe fn from_raw_string(data: String) -> Self {
        Self(data)
    }

    /// Construct a new validated owned object path.
    ///
    /// # Errors
    ///
    /// Errors if the argument is not a valid object path.
    pub fn new(path: impl Into<String>) -> Result<Self, ObjectPathError> {
        let path = path.into();

        if !validate(path.as_bytes()) {
            return Err(ObjectPathError);
        }

        // SAFETY: just validated above.
        Ok(unsafe { Self::from_raw_string(path) })
    }

    #[inline]
    fn to_object_path(&self) -> &ObjectPath {
        // SAFETY: this type ensures during construction that the object
        // path it contains is valid.
        unsafe { ObjectPath::new_unchecked(&self.0) }
    }
}

impl Deref for OwnedObjectPath {
    type Target = ObjectPath;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.to_object_path()
    }
}

impl Borrow<ObjectPath> for OwnedObjectPath {
    #[inline]
    fn borrow(&self) -> &ObjectPath {
        self
    }
}

impl AsRef<ObjectPath> for OwnedObjectPath {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl fmt::Display for OwnedObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
