//! D-Bus type signatures: validation, splitting into top-level complete
//! types, and per-type alignment.

mod stack;

use self::validation::validate;
mod validation;

pub use self::signature::{Signature, Split};
mod signature;

pub use self::signature_buf::SignatureBuf;
mod signature_buf;

pub use self::signature_error::SignatureError;
use self::signature_error::SignatureErrorKind;
mod signature_error;

#[cfg(test)]
mod tests;

/// The maximum length of a signature, in bytes.
pub(crate) const MAX_SIGNATURE: usize = 255;

/// The maximum individual container depth (arrays and structs tracked
/// separately).
pub(crate) const MAX_CONTAINER_DEPTH: usize = 32;

/// The maximum total depth across all container kinds.
pub(crate) const MAX_DEPTH: usize = MAX_CONTAINER_DEPTH * 2;
