//! Interleaved complex storage.
//!
//! A complex element stored in a real buffer spans two physical slots,
//! `[re, im]`. The POD structs below give that pair a name so interleaved
//! buffers can be reinterpreted in place with `bytemuck`.

use bytemuck::{Pod, Zeroable};
use num_complex::Complex;
use num_traits::Float;

use crate::dtype::DataType;
use crate::{Result, StridedError};

/// POD representation of `Complex<f64>`: `[re, im]` with `repr(C)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Zeroable, Pod)]
pub struct PodComplexF64 {
    pub re: f64,
    pub im: f64,
}

/// POD representation of `Complex<f32>`: `[re, im]` with `repr(C)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Zeroable, Pod)]
pub struct PodComplexF32 {
    pub re: f32,
    pub im: f32,
}

impl From<Complex<f64>> for PodComplexF64 {
    fn from(c: Complex<f64>) -> Self {
        PodComplexF64 { re: c.re, im: c.im }
    }
}

impl From<PodComplexF64> for Complex<f64> {
    fn from(p: PodComplexF64) -> Self {
        Complex { re: p.re, im: p.im }
    }
}

impl From<Complex<f32>> for PodComplexF32 {
    fn from(c: Complex<f32>) -> Self {
        PodComplexF32 { re: c.re, im: c.im }
    }
}

impl From<PodComplexF32> for Complex<f32> {
    fn from(p: PodComplexF32) -> Self {
        Complex { re: p.re, im: p.im }
    }
}

/// A real float type that can back interleaved complex storage.
pub trait ComplexComponent: Float + Pod {
    /// The `[re, im]` pair type for this component.
    type Pair: Pod + std::fmt::Debug + PartialEq + From<Complex<Self>> + Into<Complex<Self>>;

    /// Data type of a complex number with this component.
    const COMPLEX_DTYPE: DataType;
}

impl ComplexComponent for f64 {
    type Pair = PodComplexF64;
    const COMPLEX_DTYPE: DataType = DataType::Complex128;
}

impl ComplexComponent for f32 {
    type Pair = PodComplexF32;
    const COMPLEX_DTYPE: DataType = DataType::Complex64;
}

/// View an interleaved `[re, im, re, im, ...]` buffer as complex pairs.
///
/// # Errors
/// Returns [`StridedError::LengthMismatch`] if `buf` has odd length.
pub fn as_pairs<F: ComplexComponent>(buf: &[F]) -> Result<&[F::Pair]> {
    bytemuck::try_cast_slice(buf).map_err(|_| odd_length(buf.len()))
}

/// Mutable variant of [`as_pairs`].
pub fn as_pairs_mut<F: ComplexComponent>(buf: &mut [F]) -> Result<&mut [F::Pair]> {
    let len = buf.len();
    bytemuck::try_cast_slice_mut(buf).map_err(|_| odd_length(len))
}

/// Flatten complex pairs back into their interleaved real components.
pub fn pairs_as_components<F: ComplexComponent>(pairs: &[F::Pair]) -> &[F] {
    bytemuck::cast_slice(pairs)
}

fn odd_length(len: usize) -> StridedError {
    StridedError::LengthMismatch {
        expected: len + 1,
        actual: len,
    }
}
