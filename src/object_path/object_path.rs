use std::fmt;

use super::{validate, Iter, ObjectPathError, OwnedObjectPath};

/// A validated, borrowed object path.
///
/// The following rules define a [valid object path]. Implementations must
/// not send or accept messages with invalid object paths.
///
/// [valid object path]: https://dbus.freedesktop.org/doc/dbus-specification.html#message-protocol-marshaling-object-path
///
/// * The path may be of any length.
/// * The path must begin with an ASCII '/' (integer 47) character, and must
///   consist of elements separated by slash characters.
/// * Each element must only contain the ASCII characters `[A-Za-z0-9_]`.
/// * No element may be the empty string.
/// * Multiple '/' characters cannot occur in sequence.
/// * A trailing '/' character is not allowed unless the path is the root
///   path (a single '/' character).
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ObjectPath(str);

impl ObjectPath {
    /// The special `"/"` object path.
    pub const ROOT: &'static Self = Self::new_const("/");

    /// Construct a new object path.
    ///
    /// # Panics
    ///
    /// Panics if the argument is not a valid object path.
    #[track_caller]
    pub const fn new_const(path: &str) -> &Self {
        if !validate(path.as_bytes()) {
            panic!("invalid D-Bus object path");
        }

        // SAFETY: the byte slice is repr(transparent) over this type.
        unsafe { Self::new_unchecked(path) }
    }

    /// Construct a new validated object path.
    ///
    /// # Errors
    ///
    /// Errors if the argument is not a valid object path.
    pub fn new<P>(path: &P) -> Result<&Self, ObjectPathError>
    where
        P: ?Sized + AsRef<str>,
    {
        let path = path.as_ref();

        if !validate(path.as_bytes()) {
            return Err(ObjectPathError);
        }

        // SAFETY: the byte slice is repr(transparent) over this type.
        unsafe { Ok(Self::new_unchecked(path)) }
    }

    /// Construct an iterator over the segments of this object path.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_codec::object_path::ObjectPath;
    ///
    /// let mut it = ObjectPath::new_const("/").iter();
    /// assert!(it.next().is_none());
    ///
    /// let mut it = ObjectPath::new_const("/foo/bar").iter();
    /// assert_eq!(it.next(), Some("foo"));
    /// assert_eq!(it.next(), Some("bar"));
    /// assert!(it.next().is_none());
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.0)
    }

    /// Test if one path starts with another.
    #[must_use]
    pub fn starts_with(&self, other: &ObjectPath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// Construct a new unchecked object path.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the path is a valid object path.
    pub(super) const unsafe fn new_unchecked(path: &str) -> &Self {
        &*(path as *const str as *const Self)
    }

    /// Borrow this object path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<ObjectPath> for ObjectPath {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl AsRef<str> for ObjectPath {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToOwned for ObjectPath {
    type Owned = OwnedObjectPath;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // SAFETY: this type ensures its contents are a valid object path.
        unsafe { OwnedObjectPath::from_raw_string(self.0.to_owned()) }
    }
}

impl<'a> IntoIterator for &'a ObjectPath {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
