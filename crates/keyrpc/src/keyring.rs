//! # Keyring
//!
//! An ordered, immutable registry of signatures sharing one wire policy.
//!
//! ## Invariants
//! - **Positional Keys**: The key of a signature is its index in the construction list.
//!   Keys are dense, contiguous and never reassigned.
//! - **Fixed Header**: The header width is the narrowest of 1, 2 or 4 bytes that holds
//!   `len - 1`, computed once at construction.
//! - **Duplicates Allowed**: Two structurally identical signatures get distinct keys;
//!   keys alone disambiguate them.

use keypack::Decoder;
use keypack::Encoder;
use keypack::Endianness;
use keypack::Representation;
use keypack::Value;

use crate::error::Error;
use crate::error::Result;
use crate::packet;
use crate::signature::Descriptor;
use crate::signature::Signature;

/// Width of the key header on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HeaderWidth {
    One = 1,
    Two = 2,
    #[default]
    Four = 4,
}

impl HeaderWidth {
    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// Largest key addressable with this width.
    pub const fn max_key(self) -> u64 {
        match self {
            HeaderWidth::One => u8::MAX as u64,
            HeaderWidth::Two => u16::MAX as u64,
            HeaderWidth::Four => u32::MAX as u64,
        }
    }
}

/// Returns the narrowest header able to address `count` signatures.
///
/// An empty keyring uses a one byte header; every key in it is unknown.
///
/// # Errors
/// Returns `Error::TooManySignatures` if more than `max` bytes would be needed.
pub fn header_width_for(count: usize, max: HeaderWidth) -> Result<HeaderWidth> {
    let last = count.saturating_sub(1) as u64;
    let width = [HeaderWidth::One, HeaderWidth::Two, HeaderWidth::Four]
        .into_iter()
        .take_while(|w| *w <= max)
        .find(|w| last <= w.max_key());

    width.ok_or(Error::TooManySignatures { count, max_width: max.bytes() })
}

/// Configuration for a `Keyring`.
#[derive(Debug, Clone, Default)]
pub struct KeyringBuilder {
    signatures: Vec<Signature>,
    endianness: Endianness,
    repr: Representation,
    max_header_width: HeaderWidth,
}

impl KeyringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a signature. Its key is the number of signatures added before it.
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn signatures(mut self, signatures: impl IntoIterator<Item = Signature>) -> Self {
        self.signatures.extend(signatures);
        self
    }

    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn representation(mut self, repr: Representation) -> Self {
        self.repr = repr;
        self
    }

    /// Caps the header width. Defaults to four bytes.
    pub fn max_header_width(mut self, width: HeaderWidth) -> Self {
        self.max_header_width = width;
        self
    }

    /// Assigns keys and freezes the registry.
    ///
    /// # Errors
    /// Returns `Error::TooManySignatures` if the list outgrows the header cap.
    pub fn build(self) -> Result<Keyring> {
        let header_width = header_width_for(self.signatures.len(), self.max_header_width)?;
        let descriptors = self
            .signatures
            .into_iter()
            .enumerate()
            .map(|(key, signature)| Descriptor::new(key, signature))
            .collect();

        Ok(Keyring {
            descriptors,
            endianness: self.endianness,
            repr: self.repr,
            header_width,
        })
    }
}

/// An ordered, immutable collection of descriptors sharing one wire policy.
///
/// Keyrings are read-only after construction and can be shared across threads
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyring {
    descriptors: Vec<Descriptor>,
    endianness: Endianness,
    repr: Representation,
    header_width: HeaderWidth,
}

impl Keyring {
    /// Builds a keyring with the default header cap.
    pub fn new(
        signatures: impl IntoIterator<Item = Signature>,
        endianness: Endianness,
        repr: Representation,
    ) -> Result<Self> {
        KeyringBuilder::new()
            .signatures(signatures)
            .endianness(endianness)
            .representation(repr)
            .build()
    }

    pub fn builder() -> KeyringBuilder {
        KeyringBuilder::new()
    }

    /// The key of the signature at `index` in the construction list.
    ///
    /// Keys are positions, so this is the identity.
    pub fn key_for(&self, index: usize) -> usize {
        index
    }

    /// Key of the first signature named `name`.
    pub fn key_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name() == Some(name))
    }

    /// Header width in bytes.
    pub fn header_width(&self) -> usize {
        self.header_width.bytes()
    }

    /// # Errors
    /// Returns `Error::UnknownKey` if `key` is outside `[0, len)`.
    pub fn signature_at(&self, key: usize) -> Result<&Descriptor> {
        self.descriptors
            .get(key)
            .ok_or(Error::UnknownKey { key, count: self.descriptors.len() })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.descriptors.iter()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn representation(&self) -> Representation {
        self.repr
    }

    /// Full packet length for `key`: header plus payload.
    pub fn packet_len(&self, key: usize) -> Result<usize> {
        Ok(self.header_width() + self.signature_at(key)?.payload_width())
    }

    /// An encoder speaking this keyring's policy.
    pub fn encoder(&self) -> Encoder {
        Encoder::new(self.endianness, self.repr)
    }

    /// A decoder over `bytes` speaking this keyring's policy.
    pub fn decoder<'a>(&self, bytes: &'a [u8]) -> Decoder<'a> {
        Decoder::new(bytes, self.endianness, self.repr)
    }

    /// Encodes a call to `key`. See `packet::encode_call`.
    pub fn call(&self, key: usize, args: &[Value]) -> Result<Vec<u8>> {
        packet::encode_call(self, key, args)
    }
}

impl<'a> IntoIterator for &'a Keyring {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
