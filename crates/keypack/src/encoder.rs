use crate::codec;
use crate::types::Endianness;
use crate::types::Representation;
use crate::types::Result;
use crate::types::ScalarType;
use crate::types::Value;

/// An append-only encoder bound to one byte order and one signed representation.
///
/// Nothing is written on a failed call, so a rejected value leaves the buffer as it was.
#[derive(Debug, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
    endianness: Endianness,
    repr: Representation,
}

impl Encoder {
    /// Creates a new encoder with default capacity.
    pub fn new(endianness: Endianness, repr: Representation) -> Self {
        Self::with_capacity(endianness, repr, 16)
    }

    pub fn with_capacity(endianness: Endianness, repr: Representation, capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), endianness, repr }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn representation(&self) -> Representation {
        self.repr
    }

    /// Encodes `value` as its own type.
    ///
    /// # Errors
    /// See `codec::encode`.
    pub fn value(&mut self, value: Value) -> Result<&mut Self> {
        codec::encode(value, self.endianness, self.repr, &mut self.buf)?;
        Ok(self)
    }

    /// Encodes `value` into a slot of type `ty`, range-checking first.
    ///
    /// # Errors
    /// Returns `Error::OutOfRange` if `value` does not fit in `ty`.
    pub fn scalar(&mut self, ty: ScalarType, value: Value) -> Result<&mut Self> {
        let value = ty.coerce(value, self.repr)?;
        self.value(value)
    }

    /// Encodes a raw unsigned integer of `width` bytes (used for packet headers).
    pub fn unsigned(&mut self, raw: u64, width: usize) -> &mut Self {
        codec::encode_unsigned(raw, width, self.endianness, &mut self.buf);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the encoder and returns the final byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
