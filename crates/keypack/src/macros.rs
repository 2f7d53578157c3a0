//! Scalar schema macros.

/// Defines the scalar types supported by the format.
/// Arguments passed to callback:
/// 1. Rust Type
/// 2. `Value` / `ScalarType` Variant
/// 3. `as_*` Method Name
macro_rules! for_each_scalar {
    ($m:ident) => {
        $m!(u8,  U8,  as_u8);
        $m!(u16, U16, as_u16);
        $m!(u32, U32, as_u32);
        $m!(u64, U64, as_u64);
        $m!(i8,  I8,  as_i8);
        $m!(i16, I16, as_i16);
        $m!(i32, I32, as_i32);
        $m!(i64, I64, as_i64);
    };
}

/// Generates `From<T> for Value` and a checked `TryFrom<Value> for T`.
///
/// The checked conversion accepts any variant whose numeric value fits in `T`,
/// so a handler declared on `int16` may read its argument as `i32` or `u8`.
macro_rules! impl_value_conversions {
    ($ty:ty, $var:ident, $as_name:ident) => {
        impl From<$ty> for crate::types::Value {
            #[inline]
            fn from(v: $ty) -> Self {
                crate::types::Value::$var(v)
            }
        }

        impl TryFrom<crate::types::Value> for $ty {
            type Error = crate::types::Error;

            #[inline]
            fn try_from(v: crate::types::Value) -> crate::types::Result<Self> {
                <$ty>::try_from(v.as_i128()).map_err(|_| crate::types::Error::OutOfRange {
                    ty: crate::types::ScalarType::$var,
                    value: v.as_i128(),
                })
            }
        }

        impl crate::types::Value {
            /// Reads the value as this Rust type, failing if it does not fit.
            #[inline]
            pub fn $as_name(self) -> crate::types::Result<$ty> {
                <$ty>::try_from(self)
            }
        }
    };
}

pub(crate) use for_each_scalar;
pub(crate) use impl_value_conversions;
