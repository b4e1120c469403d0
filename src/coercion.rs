//! Widening and narrowing between stored column values and requested Rust shapes.
//!
//! Integer targets accept any stored integer width and truncate on narrowing; float
//! targets accept either stored float width. Neither crosses the integer/float divide.

use crate::types::RowValues;

mod sealed {
    pub trait Sealed {}
}

/// Integer widths a stored value can be read as.
pub trait IntegerType: sealed::Sealed + Copy + Default {
    /// Name reported in conversion errors.
    const TYPE_NAME: &'static str;

    fn truncate_from(value: i64) -> Self;
}

/// Float widths a stored value can be read as.
pub trait FloatType: sealed::Sealed + Copy + Default {
    const TYPE_NAME: &'static str;

    fn from_f64(value: f64) -> Self;
}

macro_rules! integer_type {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl IntegerType for $ty {
                const TYPE_NAME: &'static str = $name;

                #[allow(clippy::cast_possible_truncation)]
                fn truncate_from(value: i64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

integer_type! {
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
}

impl sealed::Sealed for f32 {}
impl sealed::Sealed for f64 {}

impl FloatType for f32 {
    const TYPE_NAME: &'static str = "float32";

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl FloatType for f64 {
    const TYPE_NAME: &'static str = "float64";

    fn from_f64(value: f64) -> Self {
        value
    }
}

fn stored_integer(value: &RowValues) -> Option<i64> {
    match value {
        RowValues::Int8(v) => Some(i64::from(*v)),
        RowValues::Int16(v) => Some(i64::from(*v)),
        RowValues::Int32(v) => Some(i64::from(*v)),
        RowValues::Int64(v) => Some(*v),
        _ => None,
    }
}

/// Read any stored integer width as `T`. Narrowing truncates.
#[must_use]
pub fn to_integer<T: IntegerType>(value: &RowValues) -> Option<T> {
    stored_integer(value).map(T::truncate_from)
}

/// Read any stored float width as `T`.
#[must_use]
pub fn to_float<T: FloatType>(value: &RowValues) -> Option<T> {
    match value {
        RowValues::Float32(v) => Some(T::from_f64(f64::from(*v))),
        RowValues::Float64(v) => Some(T::from_f64(*v)),
        _ => None,
    }
}

/// Nonzero integers are `true`; native booleans pass through.
#[must_use]
pub fn to_bool(value: &RowValues) -> Option<bool> {
    match value {
        RowValues::Bool(b) => Some(*b),
        other => stored_integer(other).map(|v| v != 0),
    }
}
