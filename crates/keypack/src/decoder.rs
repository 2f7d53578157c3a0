use crate::codec;
use crate::types::Endianness;
use crate::types::Error;
use crate::types::Representation;
use crate::types::Result;
use crate::types::ScalarType;
use crate::types::Value;

/// A zero-copy, bounds-checked cursor over a byte slice.
///
/// Reading advances the cursor. `position()` counts bytes consumed since
/// construction, so errors can point at the offending byte of a packet.
///
/// # Errors
/// All read operations return `Error::UnexpectedEnd` if the buffer is exhausted,
/// without advancing.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    position: usize,
    endianness: Endianness,
    repr: Representation,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over the slice.
    pub fn new(buf: &'a [u8], endianness: Endianness, repr: Representation) -> Self {
        Self { buf, position: 0, endianness, repr }
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Returns the offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the unread bytes without advancing.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::UnexpectedEnd {
                position: self.position,
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        self.position += n;
        Ok(head)
    }

    /// Decodes one scalar of type `ty`.
    pub fn scalar(&mut self, ty: ScalarType) -> Result<Value> {
        let bytes = self.read_bytes(ty.width())?;
        Ok(codec::decode(bytes, ty, self.endianness, self.repr))
    }

    /// Decodes a raw unsigned integer of `width` bytes (used for packet headers).
    pub fn unsigned(&mut self, width: usize) -> Result<u64> {
        let bytes = self.read_bytes(width)?;
        Ok(codec::decode_unsigned(bytes, self.endianness))
    }
}
