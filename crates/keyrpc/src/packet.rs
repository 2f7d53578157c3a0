//! # Packet Codec
//!
//! Serializes a keyed call to bytes and back.
//!
//! ## Wire Format
//! - `Packet = Header ++ Payload`
//! - `Header`: the key as an unsigned integer of `header_width()` bytes.
//! - `Payload`: each argument at the fixed width of its parameter type, in declared order.
//!
//! No length prefix, no checksum, no delimiter. Framing belongs to the transport.
//!
//! ## Invariants
//! - **Pure**: Encode and decode never mutate shared state; a failure leaves nothing behind.
//! - **Exact Length**: `decode_call` rejects both short (`TruncatedPacket`) and long
//!   (`TrailingData`) buffers.

use keypack::Value;

use crate::error::Error;
use crate::error::Result;
use crate::keyring::Keyring;

/// A decoded call: the key and its arguments, typed per the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub key: usize,
    pub args: Vec<Value>,
}

/// Encodes `header(key) ++ args[0] ++ ... ++ args[n-1]`.
///
/// Each argument is range-checked and converted into its parameter type, so
/// `Value::I32(200)` may fill a `uint8` slot.
///
/// # Errors
/// - `Error::UnknownKey` if the key is out of range.
/// - `Error::ArityMismatch` if `args.len()` differs from the parameter count.
/// - `Error::OutOfRange` if an argument does not fit its parameter.
pub fn encode_call(keyring: &Keyring, key: usize, args: &[Value]) -> Result<Vec<u8>> {
    let desc = keyring.signature_at(key)?;
    let params = desc.params();

    if args.len() != params.len() {
        return Err(Error::ArityMismatch { key, expected: params.len(), found: args.len() });
    }

    let mut enc = keyring.encoder();
    enc.unsigned(key as u64, keyring.header_width());

    for (index, (ty, arg)) in params.iter().zip(args).enumerate() {
        enc.scalar(*ty, *arg).map_err(|_| Error::OutOfRange {
            key,
            index: Some(index),
            ty: *ty,
            value: arg.as_i128(),
        })?;
    }

    Ok(enc.into_bytes())
}

/// Decodes exactly one packet spanning all of `bytes`.
///
/// # Errors
/// - `Error::TruncatedPacket` if the header or payload is short.
/// - `Error::UnknownKey` if the header names no descriptor.
/// - `Error::TrailingData` if bytes remain after the payload.
pub fn decode_call(keyring: &Keyring, bytes: &[u8]) -> Result<Call> {
    let (call, used) = decode_prefix(keyring, bytes)?;
    if used != bytes.len() {
        return Err(Error::TrailingData { key: call.key, expected: used, found: bytes.len() });
    }
    Ok(call)
}

/// Decodes the first packet of `bytes`, returning it with the number of bytes it spans.
///
/// Anything after that packet is left untouched, which lets a caller walk a buffer of
/// back-to-back packets.
///
/// # Errors
/// As `decode_call`, minus `TrailingData`.
pub fn decode_prefix(keyring: &Keyring, bytes: &[u8]) -> Result<(Call, usize)> {
    let header_width = keyring.header_width();
    let mut dec = keyring.decoder(bytes);

    let key = dec
        .unsigned(header_width)
        .map_err(|_| Error::TruncatedPacket { key: None, expected: header_width, found: bytes.len() })?;
    let key = usize::try_from(key).map_err(|_| Error::UnknownKey { key: usize::MAX, count: keyring.len() })?;

    let desc = keyring.signature_at(key)?;
    let expected = header_width + desc.payload_width();
    if bytes.len() < expected {
        return Err(Error::TruncatedPacket { key: Some(key), expected, found: bytes.len() });
    }

    let mut args = Vec::with_capacity(desc.params().len());
    for ty in desc.params() {
        // Length was checked above, a short read here is a bug.
        let value = dec
            .scalar(*ty)
            .map_err(|_| Error::TruncatedPacket { key: Some(key), expected, found: bytes.len() })?;
        args.push(value);
    }

    Ok((Call { key, args }, expected))
}

/// Peeks the key of a possibly incomplete packet.
///
/// Returns `Ok(None)` while fewer than `header_width()` bytes are present.
///
/// # Errors
/// Returns `Error::UnknownKey` as soon as the header names no descriptor.
pub fn peek_key(keyring: &Keyring, bytes: &[u8]) -> Result<Option<usize>> {
    let mut dec = keyring.decoder(bytes);
    let Ok(key) = dec.unsigned(keyring.header_width()) else {
        return Ok(None);
    };
    let key = usize::try_from(key).map_err(|_| Error::UnknownKey { key: usize::MAX, count: keyring.len() })?;
    keyring.signature_at(key)?;
    Ok(Some(key))
}
