use crate::*;
use rand::Rng;

const ENDIANS: [Endianness; 2] = [Endianness::Little, Endianness::Big];
const REPRS: [Representation; 2] = [Representation::TwosComplement, Representation::OnesComplement];

fn roundtrip(value: Value, endianness: Endianness, repr: Representation) -> Result<Value> {
    let mut enc = Encoder::new(endianness, repr);
    enc.value(value)?;
    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), value.ty().width());

    let mut dec = Decoder::new(&bytes, endianness, repr);
    let out = dec.scalar(value.ty())?;
    assert_eq!(dec.remaining(), 0);
    Ok(out)
}

// ============================================================================
//  ROUND TRIP
// ============================================================================

#[test]
fn test_roundtrip_8_and_16_bit_exhaustive() -> Result<()> {
    for endianness in ENDIANS {
        for repr in REPRS {
            for ty in [ScalarType::U8, ScalarType::I8, ScalarType::U16, ScalarType::I16] {
                for v in ty.min(repr)..=ty.max() {
                    let value = ty.coerce_i128(v, repr)?;
                    assert_eq!(roundtrip(value, endianness, repr)?, value, "{} {:?} {:?}", ty, endianness, repr);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_roundtrip_boundaries_every_width() -> Result<()> {
    for endianness in ENDIANS {
        for repr in REPRS {
            for ty in ScalarType::ALL {
                let (min, max) = (ty.min(repr), ty.max());
                for v in [min, min + 1, -1, 0, 1, max - 1, max] {
                    if v < min {
                        continue;
                    }
                    let value = ty.coerce_i128(v, repr)?;
                    assert_eq!(roundtrip(value, endianness, repr)?, value, "{} {:?} {:?}", ty, endianness, repr);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_roundtrip_random_wide() -> Result<()> {
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
        let endianness = ENDIANS[rng.gen_range(0..2)];
        let repr = REPRS[rng.gen_range(0..2)];
        let values = [
            Value::U32(rng.gen()),
            Value::U64(rng.gen()),
            Value::I32(rng.gen_range(-i32::MAX..=i32::MAX)),
            Value::I64(rng.gen_range(-i64::MAX..=i64::MAX)),
        ];
        for value in values {
            assert_eq!(roundtrip(value, endianness, repr)?, value);
        }
    }
    Ok(())
}

// ============================================================================
//  BYTE LAYOUT
// ============================================================================

#[test]
fn test_minus_one_int8_per_representation() -> Result<()> {
    let mut twos = Encoder::new(Endianness::Little, Representation::TwosComplement);
    twos.value(Value::I8(-1))?;
    assert_eq!(twos.as_bytes(), &[0xFF]);

    let mut ones = Encoder::new(Endianness::Little, Representation::OnesComplement);
    ones.value(Value::I8(-1))?;
    assert_eq!(ones.as_bytes(), &[0xFE]);

    let back = decode(&[0xFF], ScalarType::I8, Endianness::Little, Representation::TwosComplement);
    assert_eq!(back, Value::I8(-1));
    let back = decode(&[0xFE], ScalarType::I8, Endianness::Little, Representation::OnesComplement);
    assert_eq!(back, Value::I8(-1));
    Ok(())
}

#[test]
fn test_representations_agree_on_non_negative() -> Result<()> {
    for ty in ScalarType::ALL {
        for v in [0i128, 1, 42, ty.max()] {
            let value = ty.coerce_i128(v, Representation::TwosComplement)?;
            let mut a = Vec::new();
            let mut b = Vec::new();
            encode(value, Endianness::Big, Representation::TwosComplement, &mut a)?;
            encode(value, Endianness::Big, Representation::OnesComplement, &mut b)?;
            assert_eq!(a, b, "{} {}", ty, v);
        }
    }
    Ok(())
}

#[test]
fn test_endianness_byte_order() -> Result<()> {
    let mut le = Encoder::new(Endianness::Little, Representation::TwosComplement);
    le.value(Value::U32(0x11223344))?.value(Value::I16(-2))?;
    assert_eq!(le.as_bytes(), &[0x44, 0x33, 0x22, 0x11, 0xFE, 0xFF]);

    let mut be = Encoder::new(Endianness::Big, Representation::TwosComplement);
    be.value(Value::U32(0x11223344))?.value(Value::I16(-2))?;
    assert_eq!(be.as_bytes(), &[0x11, 0x22, 0x33, 0x44, 0xFF, 0xFE]);
    Ok(())
}

#[test]
fn test_ones_complement_i64_min_magnitude() -> Result<()> {
    let mut enc = Encoder::new(Endianness::Little, Representation::OnesComplement);
    enc.value(Value::I64(-i64::MAX))?;
    let mut expected = [0u8; 8];
    expected[7] = 0x80;
    assert_eq!(enc.as_bytes(), &expected);
    Ok(())
}

// ============================================================================
//  RANGE CHECKS
// ============================================================================

#[test]
fn test_ones_complement_rejects_twos_minimum() {
    let mut enc = Encoder::new(Endianness::Little, Representation::OnesComplement);
    let err = enc.value(Value::I8(i8::MIN)).unwrap_err();
    assert_eq!(err, Error::OutOfRange { ty: ScalarType::I8, value: -128 });
    assert!(enc.is_empty());
}

#[test]
fn test_scalar_coerces_into_slot() -> Result<()> {
    let mut enc = Encoder::new(Endianness::Little, Representation::TwosComplement);
    enc.scalar(ScalarType::I16, Value::U8(200))?;
    enc.scalar(ScalarType::U8, Value::I64(7))?;
    assert_eq!(enc.as_bytes(), &[0xC8, 0x00, 0x07]);

    let err = enc.scalar(ScalarType::U8, Value::U16(300)).unwrap_err();
    assert_eq!(err, Error::OutOfRange { ty: ScalarType::U8, value: 300 });
    let err = enc.scalar(ScalarType::U32, Value::I8(-1)).unwrap_err();
    assert_eq!(err, Error::OutOfRange { ty: ScalarType::U32, value: -1 });
    let err = enc.scalar(ScalarType::I8, Value::I16(128)).unwrap_err();
    assert_eq!(err, Error::OutOfRange { ty: ScalarType::I8, value: 128 });
    assert_eq!(enc.len(), 3);
    Ok(())
}

#[test]
fn test_value_conversions() -> Result<()> {
    assert_eq!(Value::from(5u8), Value::U8(5));
    assert_eq!(Value::from(-5i64), Value::I64(-5));
    assert_eq!(Value::U64(10).as_u8()?, 10u8);
    assert_eq!(i32::try_from(Value::I8(-3))?, -3);
    assert!(Value::I8(-1).as_u64().is_err());
    assert!(Value::U64(u64::MAX).as_i64().is_err());
    Ok(())
}

#[test]
fn test_type_ranges() {
    assert_eq!(ScalarType::I8.min(Representation::TwosComplement), -128);
    assert_eq!(ScalarType::I8.min(Representation::OnesComplement), -127);
    assert_eq!(ScalarType::U64.max(), u64::MAX as i128);
    assert_eq!(ScalarType::I64.min(Representation::TwosComplement), i64::MIN as i128);
    assert_eq!(ScalarType::U16.min(Representation::OnesComplement), 0);
}

// ============================================================================
//  DECODER FAILURE MODES
// ============================================================================

#[test]
fn test_decoder_unexpected_end_reports_position() -> Result<()> {
    let bytes = [0x01, 0x02, 0x03];
    let mut dec = Decoder::new(&bytes, Endianness::Little, Representation::TwosComplement);
    assert_eq!(dec.scalar(ScalarType::U16)?, Value::U16(0x0201));

    let err = dec.scalar(ScalarType::U32).unwrap_err();
    assert_eq!(err, Error::UnexpectedEnd { position: 2, needed: 4, remaining: 1 });
    assert_eq!(dec.position(), 2);
    assert_eq!(dec.rest(), &[0x03]);
    Ok(())
}

#[test]
fn test_decoder_unsigned_header() -> Result<()> {
    let bytes = [0x01, 0x2C, 0xAA];
    let mut dec = Decoder::new(&bytes, Endianness::Big, Representation::TwosComplement);
    assert_eq!(dec.unsigned(2)?, 300);
    assert_eq!(dec.scalar(ScalarType::I8)?, Value::I8(-86));
    Ok(())
}

// ============================================================================
//  POLICY PARSING
// ============================================================================

#[test]
fn test_representation_spellings() -> Result<()> {
    assert_eq!("twos_complement".parse::<Representation>()?, Representation::TwosComplement);
    assert_eq!("two_complement".parse::<Representation>()?, Representation::TwosComplement);
    assert_eq!("ones_complement".parse::<Representation>()?, Representation::OnesComplement);
    assert_eq!("one_complement".parse::<Representation>()?, Representation::OnesComplement);
    assert!("threes_complement".parse::<Representation>().is_err());
    Ok(())
}

#[test]
fn test_endianness_spellings() -> Result<()> {
    assert_eq!("little".parse::<Endianness>()?, Endianness::Little);
    assert_eq!("big_endian".parse::<Endianness>()?, Endianness::Big);
    assert_eq!(
        "middle".parse::<Endianness>().unwrap_err(),
        Error::InvalidEndianness("middle".into())
    );
    Ok(())
}
