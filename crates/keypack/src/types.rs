use std::fmt;
use std::str::FromStr;

use crate::macros::for_each_scalar;
use crate::macros::impl_value_conversions;

/// Keypack encoding and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer exhausted while reading.
    UnexpectedEnd { position: usize, needed: usize, remaining: usize },
    /// The value cannot be represented by the scalar type under the active policy.
    OutOfRange { ty: ScalarType, value: i128 },
    /// String does not name a known byte order.
    InvalidEndianness(String),
    /// String does not name a known signed representation.
    InvalidRepresentation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEnd { position, needed, remaining } => write!(
                f,
                "unexpected end of buffer at byte {}: needed {}, {} remaining",
                position, needed, remaining
            ),
            Error::OutOfRange { ty, value } => write!(f, "value {} does not fit in {}", value, ty),
            Error::InvalidEndianness(s) => write!(f, "unknown endianness '{}'", s),
            Error::InvalidRepresentation(s) => write!(f, "unknown signed representation '{}'", s),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for Keypack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Byte order of multi-byte scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl FromStr for Endianness {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "little" | "little_endian" | "le" => Ok(Endianness::Little),
            "big" | "big_endian" | "be" => Ok(Endianness::Big),
            _ => Err(Error::InvalidEndianness(s.to_string())),
        }
    }
}

/// Encoding of negative values for signed scalars.
///
/// Zero and positive values encode identically under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    /// Standard wraparound arithmetic: `-v` is `2^bits - v`.
    #[default]
    TwosComplement,
    /// Bitwise complement of the magnitude: `-v` is `!v`.
    ///
    /// Cannot represent the two's-complement minimum of a width, and has a
    /// negative zero (all ones) which decodes to `0`.
    OnesComplement,
}

impl FromStr for Representation {
    type Err = Error;

    /// Both `twos_complement` and `two_complement` name the same policy.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "twos_complement" | "two_complement" | "twos-complement" | "two-complement" => {
                Ok(Representation::TwosComplement)
            }
            "ones_complement" | "one_complement" | "ones-complement" | "one-complement" => {
                Ok(Representation::OnesComplement)
            }
            _ => Err(Error::InvalidRepresentation(s.to_string())),
        }
    }
}

/// The type of a single wire slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl ScalarType {
    /// Every supported type, unsigned first.
    pub const ALL: [ScalarType; 8] = [
        ScalarType::U8,
        ScalarType::U16,
        ScalarType::U32,
        ScalarType::U64,
        ScalarType::I8,
        ScalarType::I16,
        ScalarType::I32,
        ScalarType::I64,
    ];

    /// Encoded size in bytes.
    pub const fn width(self) -> usize {
        match self {
            ScalarType::U8 | ScalarType::I8 => 1,
            ScalarType::U16 | ScalarType::I16 => 2,
            ScalarType::U32 | ScalarType::I32 => 4,
            ScalarType::U64 | ScalarType::I64 => 8,
        }
    }

    pub const fn bits(self) -> u32 {
        (self.width() * 8) as u32
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::I64)
    }

    /// Mask selecting the low `bits()` bits of a raw word.
    pub const fn mask(self) -> u64 {
        if self.width() == 8 { u64::MAX } else { (1u64 << self.bits()) - 1 }
    }

    /// Smallest value representable under `repr`.
    pub const fn min(self, repr: Representation) -> i128 {
        if !self.is_signed() {
            return 0;
        }
        let half = 1i128 << (self.bits() - 1);
        match repr {
            Representation::TwosComplement => -half,
            Representation::OnesComplement => -(half - 1),
        }
    }

    /// Largest representable value; independent of the representation.
    pub const fn max(self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// Converts `value` into this type, checking it fits under `repr`.
    ///
    /// # Errors
    /// Returns `Error::OutOfRange` if the numeric value is outside `[min, max]`.
    pub fn coerce(self, value: Value, repr: Representation) -> Result<Value> {
        self.coerce_i128(value.as_i128(), repr)
    }

    /// Like `coerce`, for a plain integer.
    pub fn coerce_i128(self, value: i128, repr: Representation) -> Result<Value> {
        if value < self.min(repr) || value > self.max() {
            return Err(Error::OutOfRange { ty: self, value });
        }
        Ok(Value::from_i128_unchecked(self, value))
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::U8 => "uint8",
            ScalarType::U16 => "uint16",
            ScalarType::U32 => "uint32",
            ScalarType::U64 => "uint64",
            ScalarType::I8 => "int8",
            ScalarType::I16 => "int16",
            ScalarType::I32 => "int32",
            ScalarType::I64 => "int64",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
}

impl Value {
    pub const fn ty(&self) -> ScalarType {
        match self {
            Value::U8(_) => ScalarType::U8,
            Value::U16(_) => ScalarType::U16,
            Value::U32(_) => ScalarType::U32,
            Value::U64(_) => ScalarType::U64,
            Value::I8(_) => ScalarType::I8,
            Value::I16(_) => ScalarType::I16,
            Value::I32(_) => ScalarType::I32,
            Value::I64(_) => ScalarType::I64,
        }
    }

    /// The numeric value, widened so every variant fits.
    pub const fn as_i128(&self) -> i128 {
        match *self {
            Value::U8(v) => v as i128,
            Value::U16(v) => v as i128,
            Value::U32(v) => v as i128,
            Value::U64(v) => v as i128,
            Value::I8(v) => v as i128,
            Value::I16(v) => v as i128,
            Value::I32(v) => v as i128,
            Value::I64(v) => v as i128,
        }
    }

    /// Caller guarantees `value` lies within `ty`'s range.
    pub(crate) const fn from_i128_unchecked(ty: ScalarType, value: i128) -> Value {
        match ty {
            ScalarType::U8 => Value::U8(value as u8),
            ScalarType::U16 => Value::U16(value as u16),
            ScalarType::U32 => Value::U32(value as u32),
            ScalarType::U64 => Value::U64(value as u64),
            ScalarType::I8 => Value::I8(value as i8),
            ScalarType::I16 => Value::I16(value as i16),
            ScalarType::I32 => Value::I32(value as i32),
            ScalarType::I64 => Value::I64(value as i64),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i128())
    }
}

for_each_scalar!(impl_value_conversions);
