//! Nested (array-of-arrays) representation.
//!
//! [`Nested`] is the interchange form for callers that hold genuinely nested
//! data. Internally everything is a flat row-major [`NdArray`]; conversion
//! in either direction is a single pass.

use crate::builders::filled;
use crate::view::NdArray;
use crate::{Result, StridedError};

/// A nested array of fixed depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Scalar(T),
    Array(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// Shape inferred from the first element at every level.
    ///
    /// An empty `Array` ends the shape; the result does not check raggedness.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut node = self;
        while let Nested::Array(items) = node {
            shape.push(items.len());
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        shape
    }

    /// Depth of nesting; a scalar has depth 0.
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }
}

fn flatten_into<T>(node: Nested<T>, shape: &[usize], out: &mut Vec<T>) -> Result<()> {
    match (node, shape.split_first()) {
        (Nested::Scalar(v), None) => {
            out.push(v);
            Ok(())
        }
        (Nested::Array(items), Some((&n, rest))) => {
            if items.len() != n {
                return Err(StridedError::RaggedNested);
            }
            for item in items {
                flatten_into(item, rest, out)?;
            }
            Ok(())
        }
        _ => Err(StridedError::RaggedNested),
    }
}

fn build<T>(data: &mut std::vec::IntoIter<T>, shape: &[usize]) -> Nested<T> {
    match shape.split_first() {
        None => match data.next() {
            Some(v) => Nested::Scalar(v),
            None => unreachable!("flat buffer shorter than its shape"),
        },
        Some((&n, rest)) => {
            let mut items = Vec::with_capacity(n);
            for _ in 0..n {
                items.push(build(data, rest));
            }
            Nested::Array(items)
        }
    }
}

impl<T> NdArray<T> {
    /// Convert a nested array into a flat row-major array.
    ///
    /// # Errors
    /// Returns [`StridedError::RaggedNested`] if sibling sub-arrays differ in
    /// length or depth.
    pub fn from_nested(nested: Nested<T>) -> Result<Self> {
        let shape = nested.shape();
        let mut data = Vec::new();
        flatten_into(nested, &shape, &mut data)?;
        NdArray::from_vec(data, &shape)
    }

    /// Rebuild the nested representation of this array.
    pub fn to_nested(self) -> Nested<T> {
        let shape = self.shape().to_vec();
        let mut data = self.into_vec().into_iter();
        build(&mut data, &shape)
    }
}

/// A nested array of `shape` filled with clones of `value`.
pub fn filled_nested<T: Clone>(value: T, shape: &[usize]) -> Nested<T> {
    filled(value, shape).to_nested()
}
