//! # Error Definitions
//!
//! The central ledger of all call-encoding, decoding and dispatch failures.
//!
//! Every variant carries the key and the byte counts involved so a failure can be
//! lined up against a captured transport trace.

use keypack::ScalarType;

/// Failures of the keyring, packet codec and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The key has no descriptor in the keyring.
    UnknownKey { key: usize, count: usize },
    /// The number of arguments differs from the descriptor's parameter count.
    ArityMismatch { key: usize, expected: usize, found: usize },
    /// A handler result disagrees with the declared return type
    /// (a value from a fire-and-forget handler, or none where one is declared).
    TypeMismatch { key: usize, expected: Option<ScalarType>, found: Option<ScalarType> },
    /// A value does not fit in its slot. `index` is the argument position,
    /// or `None` for a return value.
    OutOfRange { key: usize, index: Option<usize>, ty: ScalarType, value: i128 },
    /// Fewer bytes than the header plus the payload of `key`.
    /// `key` is `None` when even the header is incomplete.
    TruncatedPacket { key: Option<usize>, expected: usize, found: usize },
    /// More bytes than the header plus the payload of `key`.
    TrailingData { key: usize, expected: usize, found: usize },
    /// The keyring needs a header wider than `max_width` bytes.
    TooManySignatures { count: usize, max_width: usize },
    /// The key has a descriptor but no handler was bound to it.
    UnregisteredKey { key: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownKey { key, count } => {
                write!(f, "unknown key {} (keyring holds {} signatures)", key, count)
            }
            Error::ArityMismatch { key, expected, found } => {
                write!(f, "key {}: expected {} arguments, found {}", key, expected, found)
            }
            Error::TypeMismatch { key, expected, found } => write!(
                f,
                "key {}: expected return {}, handler produced {}",
                key,
                type_desc(expected),
                type_desc(found)
            ),
            Error::OutOfRange { key, index: Some(i), ty, value } => {
                write!(f, "key {}: argument {} value {} does not fit in {}", key, i, value, ty)
            }
            Error::OutOfRange { key, index: None, ty, value } => {
                write!(f, "key {}: return value {} does not fit in {}", key, value, ty)
            }
            Error::TruncatedPacket { key: Some(key), expected, found } => {
                write!(f, "key {}: truncated packet, expected {} bytes, found {}", key, expected, found)
            }
            Error::TruncatedPacket { key: None, expected, found } => {
                write!(f, "truncated header, expected {} bytes, found {}", expected, found)
            }
            Error::TrailingData { key, expected, found } => write!(
                f,
                "key {}: {} trailing bytes after the {} byte packet",
                key,
                found - expected,
                expected
            ),
            Error::TooManySignatures { count, max_width } => write!(
                f,
                "{} signatures cannot be addressed by a {} byte header",
                count, max_width
            ),
            Error::UnregisteredKey { key } => write!(f, "no handler bound to key {}", key),
        }
    }
}

impl std::error::Error for Error {}

fn type_desc(ty: &Option<ScalarType>) -> &'static str {
    match ty {
        Some(ty) => ty.name(),
        None => "nothing",
    }
}

/// A specialized Result type for keyring operations.
pub type Result<T> = std::result::Result<T, Error>;
