//! Builders for freshly allocated N-d arrays.
//!
//! Output is always a new row-major [`NdArray`]; no accessor resolution is
//! involved. Values are pushed one at a time, innermost dimension first.

use num_traits::{One, Zero};

use crate::shape::numel;
use crate::view::NdArray;

/// An array of `shape` with every element a clone of `value`.
///
/// A zero-sized dimension yields an empty array; the empty shape yields a
/// single element.
pub fn filled<T: Clone>(value: T, shape: &[usize]) -> NdArray<T> {
    filled_by(shape, |_| value.clone())
}

/// An array of `shape` whose elements are `f(i)` for row-major position `i`.
pub fn filled_by<T, F>(shape: &[usize], mut f: F) -> NdArray<T>
where
    F: FnMut(usize) -> T,
{
    let total = numel(shape);
    let mut data = Vec::with_capacity(total);
    for i in 0..total {
        data.push(f(i));
    }
    match NdArray::from_vec(data, shape) {
        Ok(array) => array,
        Err(_) => unreachable!("pushed exactly numel(shape) elements"),
    }
}

/// Zero-filled array.
pub fn zeros<T: Zero + Clone>(shape: &[usize]) -> NdArray<T> {
    filled(T::zero(), shape)
}

/// Array of ones.
pub fn ones<T: One + Clone>(shape: &[usize]) -> NdArray<T> {
    filled(T::one(), shape)
}
