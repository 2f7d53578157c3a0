//! # Signatures
//!
//! The shape of one native function: ordered parameter types and an optional return type.

use std::fmt;

use keypack::ScalarType;

/// The shape of a function, before it has a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: Option<String>,
    params: Vec<ScalarType>,
    ret: Option<ScalarType>,
}

impl Signature {
    pub fn new(params: impl Into<Vec<ScalarType>>, ret: Option<ScalarType>) -> Self {
        Self { name: None, params: params.into(), ret }
    }

    /// A function returning `ret`.
    pub fn function(params: impl Into<Vec<ScalarType>>, ret: ScalarType) -> Self {
        Self::new(params, Some(ret))
    }

    /// A fire-and-forget function with no return value.
    pub fn procedure(params: impl Into<Vec<ScalarType>>) -> Self {
        Self::new(params, None)
    }

    /// Attaches a name, used only for lookups and logs. It never reaches the wire.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &[ScalarType] {
        &self.params
    }

    pub fn ret(&self) -> Option<ScalarType> {
        self.ret
    }

    /// Sum of the parameter widths.
    pub fn payload_width(&self) -> usize {
        self.params.iter().map(|ty| ty.width()).sum()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name.as_deref().unwrap_or("fn"))?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        match self.ret {
            Some(ty) => write!(f, ") -> {}", ty),
            None => write!(f, ")"),
        }
    }
}

/// A signature bound to its key within a keyring.
///
/// **Invariant**: `key` equals the signature's position in the list the keyring was
/// built from. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    key: usize,
    signature: Signature,
}

impl Descriptor {
    pub(crate) fn new(key: usize, signature: Signature) -> Self {
        Self { key, signature }
    }

    pub fn key(&self) -> usize {
        self.key
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn name(&self) -> Option<&str> {
        self.signature.name()
    }

    pub fn params(&self) -> &[ScalarType] {
        self.signature.params()
    }

    pub fn ret(&self) -> Option<ScalarType> {
        self.signature.ret()
    }

    pub fn payload_width(&self) -> usize {
        self.signature.payload_width()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.key, self.signature)
    }
}
