//! Data-type registry.
//!
//! Every array storage kind the crate understands is named by a [`DataType`].
//! The set is fixed at compile time; classification queries are pure lookups.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;

use crate::{Result, StridedError};

/// Element storage kind of an array.
///
/// The discriminants are dense ordinals, used to index the cast tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum DataType {
    /// 64-bit IEEE 754 floating point
    Float64 = 0,
    /// 32-bit IEEE 754 floating point
    Float32 = 1,
    /// 32-bit signed integer
    Int32 = 2,
    /// 16-bit signed integer
    Int16 = 3,
    /// 8-bit signed integer
    Int8 = 4,
    /// 32-bit unsigned integer
    Uint32 = 5,
    /// 16-bit unsigned integer
    Uint16 = 6,
    /// 8-bit unsigned integer
    Uint8 = 7,
    /// 8-bit unsigned integer, clamped on write
    Uint8c = 8,
    /// Complex number with two 64-bit float components
    Complex128 = 9,
    /// Complex number with two 32-bit float components
    Complex64 = 10,
    /// Boolean
    Bool = 11,
    /// Untyped storage of arbitrary values
    Generic = 12,
}

/// Classification tag returned by [`DataType::categories`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// Real or complex floating point.
    FloatingPoint,
    /// `float32`, `float64`
    RealFloatingPoint,
    /// `complex64`, `complex128`
    ComplexFloatingPoint,
    /// Signed or unsigned integer.
    Integer,
    SignedInteger,
    UnsignedInteger,
    /// Integers and real floats.
    Real,
    /// Every integer, float and complex type.
    Numeric,
    /// Untyped storage.
    Generic,
    Boolean,
}

use Category as C;

const REAL_FLOAT: &[Category] = &[C::FloatingPoint, C::RealFloatingPoint, C::Real, C::Numeric];
const COMPLEX_FLOAT: &[Category] = &[C::FloatingPoint, C::ComplexFloatingPoint, C::Numeric];
const SIGNED_INT: &[Category] = &[C::Integer, C::SignedInteger, C::Real, C::Numeric];
const UNSIGNED_INT: &[Category] = &[C::Integer, C::UnsignedInteger, C::Real, C::Numeric];
const BOOLEAN: &[Category] = &[C::Boolean];
const GENERIC: &[Category] = &[C::Generic];

impl DataType {
    /// Number of data types.
    pub const COUNT: usize = 13;

    /// All data types in ordinal order.
    pub const ALL: [DataType; DataType::COUNT] = [
        DataType::Float64,
        DataType::Float32,
        DataType::Int32,
        DataType::Int16,
        DataType::Int8,
        DataType::Uint32,
        DataType::Uint16,
        DataType::Uint8,
        DataType::Uint8c,
        DataType::Complex128,
        DataType::Complex64,
        DataType::Bool,
        DataType::Generic,
    ];

    /// Dense ordinal of this data type.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Float64 => "float64",
            DataType::Float32 => "float32",
            DataType::Int32 => "int32",
            DataType::Int16 => "int16",
            DataType::Int8 => "int8",
            DataType::Uint32 => "uint32",
            DataType::Uint16 => "uint16",
            DataType::Uint8 => "uint8",
            DataType::Uint8c => "uint8c",
            DataType::Complex128 => "complex128",
            DataType::Complex64 => "complex64",
            DataType::Bool => "bool",
            DataType::Generic => "generic",
        }
    }

    /// Every category this data type belongs to.
    pub const fn categories(self) -> &'static [Category] {
        match self {
            DataType::Float64 | DataType::Float32 => REAL_FLOAT,
            DataType::Complex128 | DataType::Complex64 => COMPLEX_FLOAT,
            DataType::Int32 | DataType::Int16 | DataType::Int8 => SIGNED_INT,
            DataType::Uint32 | DataType::Uint16 | DataType::Uint8 | DataType::Uint8c => {
                UNSIGNED_INT
            }
            DataType::Bool => BOOLEAN,
            DataType::Generic => GENERIC,
        }
    }

    /// Returns true if this data type belongs to `category`.
    pub fn is(self, category: Category) -> bool {
        self.categories().contains(&category)
    }

    /// Size in bytes of one logical element. `None` for generic storage.
    pub const fn byte_width(self) -> Option<usize> {
        match self {
            DataType::Bool | DataType::Int8 | DataType::Uint8 | DataType::Uint8c => Some(1),
            DataType::Int16 | DataType::Uint16 => Some(2),
            DataType::Float32 | DataType::Int32 | DataType::Uint32 => Some(4),
            DataType::Float64 | DataType::Complex64 => Some(8),
            DataType::Complex128 => Some(16),
            DataType::Generic => None,
        }
    }

    #[inline]
    pub const fn is_floating_point(self) -> bool {
        self.is_real_floating_point() || self.is_complex_floating_point()
    }

    #[inline]
    pub const fn is_real_floating_point(self) -> bool {
        matches!(self, DataType::Float64 | DataType::Float32)
    }

    #[inline]
    pub const fn is_complex_floating_point(self) -> bool {
        matches!(self, DataType::Complex128 | DataType::Complex64)
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    #[inline]
    pub const fn is_signed_integer(self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int16 | DataType::Int8)
    }

    #[inline]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            DataType::Uint32 | DataType::Uint16 | DataType::Uint8 | DataType::Uint8c
        )
    }

    /// Real-valued numeric types (integers and real floats).
    #[inline]
    pub const fn is_real(self) -> bool {
        self.is_integer() || self.is_real_floating_point()
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_real() || self.is_complex_floating_point()
    }

    #[inline]
    pub const fn is_generic(self) -> bool {
        matches!(self, DataType::Generic)
    }

    #[inline]
    pub const fn is_boolean(self) -> bool {
        matches!(self, DataType::Bool)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = StridedError;

    fn from_str(s: &str) -> Result<Self> {
        DataType::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| StridedError::UnknownDataType(s.to_string()))
    }
}

/// Classify a data type given by name.
///
/// # Errors
/// Returns [`StridedError::UnknownDataType`] if `name` is not a known data type.
pub fn classify(name: &str) -> Result<&'static [Category]> {
    name.parse::<DataType>().map(DataType::categories)
}

// ============================================================================
// Element types
// ============================================================================

/// A Rust type usable as an array element.
///
/// The associated constant is the explicit dtype tag of arrays storing this
/// type. Types that do not override it are treated as generic storage.
///
/// ```
/// use strided_dispatch::{DataType, Element};
///
/// #[derive(Clone)]
/// struct Label(&'static str);
/// impl Element for Label {}
///
/// assert_eq!(<f32 as Element>::DTYPE, DataType::Float32);
/// assert_eq!(<Label as Element>::DTYPE, DataType::Generic);
/// ```
pub trait Element: Clone {
    const DTYPE: DataType = DataType::Generic;
}

macro_rules! impl_element {
    ($($t:ty => $dt:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: DataType = DataType::$dt;
            }
        )*
    };
}

impl_element!(
    f64 => Float64,
    f32 => Float32,
    i32 => Int32,
    i16 => Int16,
    i8 => Int8,
    u32 => Uint32,
    u16 => Uint16,
    u8 => Uint8,
    bool => Bool,
    Complex<f64> => Complex128,
    Complex<f32> => Complex64,
);

impl Element for i64 {}
impl Element for u64 {}
impl Element for usize {}
impl Element for isize {}
impl Element for char {}
impl Element for String {}
impl<T: Clone> Element for Option<T> {}
