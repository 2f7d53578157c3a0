//! # Keypack
//!
//! A fixed-width, untagged scalar codec for calls between peers that already
//! agree on every function signature.
//!
//! ## Philosophy
//!
//! - **No Self-Description**: The wire carries no tags and no lengths. Both sides
//!   know the type of every slot ahead of time, so each scalar costs exactly its width.
//! - **Policy, not Type**: Byte order and the encoding of negative numbers are chosen
//!   once per codec (`Endianness`, `Representation`) and apply to every scalar.
//! - **Bounded**: Decoders are zero-copy, bounds-checked views that report the byte
//!   position of a short read.
//!
//! ## Format
//!
//! - **Scalars**: `[Data: width(type)]` where width is 1, 2, 4 or 8 bytes.
//! - **Unsigned headers**: `[Data: 1..=8]` raw unsigned integer, same byte order.

mod macros;

pub mod types;
pub mod codec;
pub mod encoder;
pub mod decoder;

pub use types::Endianness;
pub use types::Error;
pub use types::Representation;
pub use types::Result;
pub use types::ScalarType;
pub use types::Value;

pub use codec::decode;
pub use codec::decode_unsigned;
pub use codec::encode;
pub use codec::encode_unsigned;

pub use encoder::Encoder;
pub use decoder::Decoder;

#[cfg(test)]
mod tests;
