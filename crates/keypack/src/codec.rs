//! # Scalar Codec
//!
//! Single-value encode and decode, dispatched on `ScalarType`.
//!
//! ## Invariants
//! - **Exact Width**: `encode` appends exactly `ty.width()` bytes. `decode` must be given
//!   exactly `ty.width()` bytes; anything else is a bug in the caller and panics.
//! - **Lossless**: `decode(encode(v)) == v` for every value representable under the policy.
//! - **Policy Scope**: `Representation` only affects negative values of signed types.

use crate::types::Endianness;
use crate::types::Error;
use crate::types::Representation;
use crate::types::Result;
use crate::types::ScalarType;
use crate::types::Value;

/// Appends the encoding of `value` to `out`.
///
/// # Errors
/// Returns `Error::OutOfRange` only for `OnesComplement` and the two's-complement
/// minimum of a signed width, which has no ones'-complement encoding.
pub fn encode(value: Value, endianness: Endianness, repr: Representation, out: &mut Vec<u8>) -> Result<()> {
    let raw = to_raw(value, repr)?;
    write_raw(raw, value.ty().width(), endianness, out);
    Ok(())
}

/// Decodes a value of type `ty` from exactly `ty.width()` bytes.
///
/// # Panics
/// If `bytes.len() != ty.width()`.
pub fn decode(bytes: &[u8], ty: ScalarType, endianness: Endianness, repr: Representation) -> Value {
    assert_eq!(bytes.len(), ty.width(), "{} decode requires exactly {} bytes", ty, ty.width());
    from_raw(read_raw(bytes, endianness), ty, repr)
}

/// Appends `raw` as an unsigned integer of `width` bytes.
///
/// # Panics
/// If `width` is not in `1..=8` or `raw` does not fit in `width` bytes.
pub fn encode_unsigned(raw: u64, width: usize, endianness: Endianness, out: &mut Vec<u8>) {
    assert!((1..=8).contains(&width), "unsigned width {} out of 1..=8", width);
    assert!(width == 8 || raw >> (width * 8) == 0, "{} does not fit in {} bytes", raw, width);
    write_raw(raw, width, endianness, out);
}

/// Decodes an unsigned integer spanning all of `bytes`.
///
/// # Panics
/// If `bytes` is empty or longer than 8.
pub fn decode_unsigned(bytes: &[u8], endianness: Endianness) -> u64 {
    assert!((1..=8).contains(&bytes.len()), "unsigned width {} out of 1..=8", bytes.len());
    read_raw(bytes, endianness)
}

fn to_raw(value: Value, repr: Representation) -> Result<u64> {
    let ty = value.ty();
    let v = value.as_i128();
    if v >= 0 {
        return Ok(v as u64);
    }
    if v < ty.min(repr) {
        return Err(Error::OutOfRange { ty, value: v });
    }
    let raw = match repr {
        Representation::TwosComplement => v as i64 as u64,
        Representation::OnesComplement => !((-v) as u64),
    };
    Ok(raw & ty.mask())
}

fn from_raw(raw: u64, ty: ScalarType, repr: Representation) -> Value {
    let raw = raw & ty.mask();
    if !ty.is_signed() || raw >> (ty.bits() - 1) == 0 {
        return Value::from_i128_unchecked(ty, raw as i128);
    }
    let v = match repr {
        Representation::TwosComplement => raw as i128 - (1i128 << ty.bits()),
        Representation::OnesComplement => -((!raw & ty.mask()) as i128),
    };
    Value::from_i128_unchecked(ty, v)
}

fn write_raw(raw: u64, width: usize, endianness: Endianness, out: &mut Vec<u8>) {
    match endianness {
        Endianness::Little => out.extend_from_slice(&raw.to_le_bytes()[..width]),
        Endianness::Big => out.extend_from_slice(&raw.to_be_bytes()[8 - width..]),
    }
}

fn read_raw(bytes: &[u8], endianness: Endianness) -> u64 {
    match endianness {
        Endianness::Little => bytes.iter().rev().fold(0u64, |acc, b| (acc << 8) | *b as u64),
        Endianness::Big => bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64),
    }
}
