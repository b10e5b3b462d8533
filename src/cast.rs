//! Pairwise cast-safety relations between data types.
//!
//! The relations are evaluated once at compile time into a dense table
//! indexed by [`DataType::ordinal`]; lookups never recompute them.

use crate::dtype::DataType;

/// Strongest safety guarantee of a cast, ordered `Unsafe < SameKind < MostlySafe < Safe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CastSafety {
    /// No guarantee.
    Unsafe,
    /// Stays within, or moves up, the kind hierarchy `unsigned < signed < float < complex`.
    SameKind,
    /// Safe, or a floating-point downcast that may lose precision but not kind.
    MostlySafe,
    /// Every value of the source is representable in the target.
    Safe,
}

/// Casting policy accepted by [`is_allowed_cast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Casting {
    /// Only identical data types.
    No,
    /// Identical data types (byte order is not modelled).
    Equiv,
    /// Only casts that preserve every value.
    Safe,
    /// Safe casts plus floating-point downcasts.
    MostlySafe,
    /// Casts that do not move to a lower kind.
    SameKind,
    /// Anything goes.
    Unsafe,
}

const N: usize = DataType::COUNT;

static CAST_TABLE: [[CastSafety; N]; N] = build_table();

const fn build_table() -> [[CastSafety; N]; N] {
    let mut table = [[CastSafety::Unsafe; N]; N];
    let mut i = 0;
    while i < N {
        let mut j = 0;
        while j < N {
            table[i][j] = relation(DataType::ALL[i], DataType::ALL[j]);
            j += 1;
        }
        i += 1;
    }
    table
}

const fn relation(from: DataType, to: DataType) -> CastSafety {
    if is_safe(from, to) {
        CastSafety::Safe
    } else if is_float_downcast(from, to) {
        CastSafety::MostlySafe
    } else if is_kind_preserving(from, to) {
        CastSafety::SameKind
    } else {
        CastSafety::Unsafe
    }
}

/// Clamped and plain `uint8` share a value range.
const fn canonical(dt: DataType) -> DataType {
    match dt {
        DataType::Uint8c => DataType::Uint8,
        other => other,
    }
}

/// Bit width of an integer type or of one float component.
const fn bits(dt: DataType) -> u32 {
    match dt {
        DataType::Int8 | DataType::Uint8 | DataType::Uint8c => 8,
        DataType::Int16 | DataType::Uint16 => 16,
        DataType::Int32 | DataType::Uint32 | DataType::Float32 | DataType::Complex64 => 32,
        DataType::Float64 | DataType::Complex128 => 64,
        DataType::Bool | DataType::Generic => 0,
    }
}

/// Widest integer (in bits) a float component of `float_bits` represents exactly.
const fn exact_int_bits(float_bits: u32) -> u32 {
    match float_bits {
        32 => 16,
        64 => 32,
        _ => 0,
    }
}

/// `unsigned < signed < real float < complex`; `None` for non-numeric types.
const fn kind_rank(dt: DataType) -> Option<u8> {
    if dt.is_unsigned_integer() {
        Some(0)
    } else if dt.is_signed_integer() {
        Some(1)
    } else if dt.is_real_floating_point() {
        Some(2)
    } else if dt.is_complex_floating_point() {
        Some(3)
    } else {
        None
    }
}

const fn is_safe(from: DataType, to: DataType) -> bool {
    if matches!(to, DataType::Generic) {
        return true;
    }
    let from = canonical(from);
    let to = canonical(to);
    if from as u8 == to as u8 {
        return true;
    }
    if from.is_generic() || from.is_boolean() || to.is_boolean() {
        return false;
    }
    if from.is_integer() {
        if to.is_floating_point() {
            return bits(from) <= exact_int_bits(bits(to));
        }
        if from.is_unsigned_integer() {
            return if to.is_unsigned_integer() {
                bits(to) >= bits(from)
            } else {
                bits(to) > bits(from)
            };
        }
        return to.is_signed_integer() && bits(to) >= bits(from);
    }
    if from.is_real_floating_point() {
        return to.is_floating_point() && bits(to) >= bits(from);
    }
    // complex
    to.is_complex_floating_point() && bits(to) >= bits(from)
}

const fn is_float_downcast(from: DataType, to: DataType) -> bool {
    (from.is_real_floating_point() && to.is_floating_point())
        || (from.is_complex_floating_point() && to.is_complex_floating_point())
}

const fn is_kind_preserving(from: DataType, to: DataType) -> bool {
    match (kind_rank(from), kind_rank(to)) {
        (Some(a), Some(b)) => a <= b,
        _ => false,
    }
}

/// Strongest safety relation for casting `from` to `to`.
#[inline]
pub fn cast_safety(from: DataType, to: DataType) -> CastSafety {
    CAST_TABLE[from.ordinal()][to.ordinal()]
}

#[inline]
pub fn is_safe_cast(from: DataType, to: DataType) -> bool {
    cast_safety(from, to) == CastSafety::Safe
}

#[inline]
pub fn is_mostly_safe_cast(from: DataType, to: DataType) -> bool {
    cast_safety(from, to) >= CastSafety::MostlySafe
}

#[inline]
pub fn is_same_kind_cast(from: DataType, to: DataType) -> bool {
    cast_safety(from, to) >= CastSafety::SameKind
}

/// Returns true if `casting` permits converting `from` to `to`.
pub fn is_allowed_cast(from: DataType, to: DataType, casting: Casting) -> bool {
    match casting {
        Casting::No | Casting::Equiv => from == to,
        Casting::Safe => is_safe_cast(from, to),
        Casting::MostlySafe => is_mostly_safe_cast(from, to),
        Casting::SameKind => is_same_kind_cast(from, to),
        Casting::Unsafe => true,
    }
}

/// Data types `from` may be cast to with at least the given safety.
pub fn casts_from(from: DataType, at_least: CastSafety) -> impl Iterator<Item = DataType> {
    DataType::ALL
        .into_iter()
        .filter(move |&to| cast_safety(from, to) >= at_least)
}
