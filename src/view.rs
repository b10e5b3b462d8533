//! Rank-N views over flat array storage.
//!
//! - [`NdView`]: immutable view over any [`ArrayLike`]
//! - [`NdViewMut`]: mutable view, the output operand of the kernels
//! - [`NdArray`]: owned row-major N-d array, the result of builders and
//!   allocating kernels
//!
//! A nested array of arrays is modelled as a rank-N view over one flat buffer.

use std::ops::{Index, IndexMut};

use crate::accessor::{resolve, ArrayLike};
use crate::broadcast::broadcast_strides;
use crate::dtype::Element;
use crate::shape::{numel, offset_of, row_major_strides, validate_bounds};
use crate::{Result, StridedError};

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(StridedError::LengthMismatch { expected, actual });
    }
    Ok(())
}

fn permuted(shape: &[usize], strides: &[isize], perm: &[usize]) -> Result<(Vec<usize>, Vec<isize>)> {
    let rank = shape.len();
    if perm.len() != rank {
        return Err(StridedError::RankMismatch(perm.len(), rank));
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return Err(StridedError::InvalidAxis { axis: p, rank });
        }
        seen[p] = true;
    }
    Ok((
        perm.iter().map(|&p| shape[p]).collect(),
        perm.iter().map(|&p| strides[p]).collect(),
    ))
}

// ============================================================================
// NdView
// ============================================================================

/// Immutable strided view over an [`ArrayLike`] storage.
pub struct NdView<'a, A: ArrayLike + ?Sized> {
    data: &'a A,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

impl<A: ArrayLike + ?Sized> Clone for NdView<'_, A> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<A: ArrayLike + ?Sized> std::fmt::Debug for NdView<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdView")
            .field("dtype", &self.data.dtype())
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, A: ArrayLike + ?Sized> NdView<'a, A> {
    /// Create a strided view.
    ///
    /// # Errors
    /// Returns an error if the view would reach outside `data`.
    pub fn new(data: &'a A, shape: &[usize], strides: &[isize], offset: usize) -> Result<Self> {
        validate_bounds(data.len(), shape, strides, offset)?;
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
            offset,
        })
    }

    /// View all of `data` as a row-major array of `shape`.
    ///
    /// # Errors
    /// Returns [`StridedError::LengthMismatch`] if `shape` does not cover `data` exactly.
    pub fn row_major(data: &'a A, shape: &[usize]) -> Result<Self> {
        check_len(numel(shape), data.len())?;
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
            offset: 0,
        })
    }

    /// One-dimensional view of the whole array.
    pub fn from_array(data: &'a A) -> Self {
        Self {
            data,
            shape: vec![data.len()],
            strides: vec![1],
            offset: 0,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn data(&self) -> &'a A {
        self.data
    }

    /// Read one element. Resolves accessors on every call; kernels resolve once instead.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: &[usize]) -> A::Elem {
        assert_eq!(index.len(), self.ndim(), "index rank mismatch");
        for (&i, &d) in index.iter().zip(&self.shape) {
            assert!(i < d, "index out of bounds");
        }
        resolve(self.data).get(self.data, offset_of(index, &self.strides, self.offset))
    }

    /// Stretch this view to `target` by giving broadcast dimensions stride 0.
    pub fn broadcast_to(&self, target: &[usize]) -> Result<NdView<'a, A>> {
        let strides = broadcast_strides(target, &self.shape, &self.strides)?;
        Ok(NdView {
            data: self.data,
            shape: target.to_vec(),
            strides,
            offset: self.offset,
        })
    }

    /// Permute dimensions; `perm[i]` names the source dimension of output dimension `i`.
    pub fn permute(&self, perm: &[usize]) -> Result<NdView<'a, A>> {
        let (shape, strides) = permuted(&self.shape, &self.strides, perm)?;
        Ok(NdView {
            data: self.data,
            shape,
            strides,
            offset: self.offset,
        })
    }
}

// ============================================================================
// NdViewMut
// ============================================================================

/// Mutable strided view over an [`ArrayLike`] storage.
pub struct NdViewMut<'a, A: ArrayLike + ?Sized> {
    data: &'a mut A,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

impl<A: ArrayLike + ?Sized> std::fmt::Debug for NdViewMut<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdViewMut")
            .field("dtype", &self.data.dtype())
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, A: ArrayLike + ?Sized> NdViewMut<'a, A> {
    /// Create a mutable strided view.
    ///
    /// Strides must not alias distinct indices to the same element; zero
    /// strides are accepted only along dimensions of size 1.
    pub fn new(data: &'a mut A, shape: &[usize], strides: &[isize], offset: usize) -> Result<Self> {
        validate_bounds(data.len(), shape, strides, offset)?;
        for (dim, (&n, &s)) in shape.iter().zip(strides).enumerate() {
            if s == 0 && n > 1 {
                return Err(StridedError::ZeroStride { dim });
            }
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: strides.to_vec(),
            offset,
        })
    }

    pub fn row_major(data: &'a mut A, shape: &[usize]) -> Result<Self> {
        check_len(numel(shape), data.len())?;
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
            offset: 0,
        })
    }

    pub fn from_array(data: &'a mut A) -> Self {
        let len = data.len();
        Self {
            data,
            shape: vec![len],
            strides: vec![1],
            offset: 0,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> NdView<'_, A> {
        NdView {
            data: &*self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut A {
        &mut *self.data
    }

    pub fn permute(self, perm: &[usize]) -> Result<NdViewMut<'a, A>> {
        let (shape, strides) = permuted(&self.shape, &self.strides, perm)?;
        Ok(NdViewMut {
            data: self.data,
            shape,
            strides,
            offset: self.offset,
        })
    }

    pub fn get(&self, index: &[usize]) -> A::Elem {
        self.as_view().get(index)
    }

    /// Write one element.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: &[usize], value: A::Elem) {
        assert_eq!(index.len(), self.ndim(), "index rank mismatch");
        for (&i, &d) in index.iter().zip(&self.shape) {
            assert!(i < d, "index out of bounds");
        }
        let flat = offset_of(index, &self.strides, self.offset);
        resolve(&*self.data).set(self.data, flat, value);
    }
}

// ============================================================================
// NdArray
// ============================================================================

/// Owned row-major N-dimensional array over a flat `Vec<T>`.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl<T> NdArray<T> {
    /// Wrap `data` as a row-major array of `shape`.
    ///
    /// # Errors
    /// Returns [`StridedError::LengthMismatch`] if `data.len()` differs from the element count of `shape`.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        check_len(numel(shape), data.len())?;
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
        })
    }

    /// Create an array with values produced by a function.
    ///
    /// The function is called with indices in row-major iteration order.
    pub fn from_fn(shape: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total = numel(shape);
        let rank = shape.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in (0..rank).rev() {
                idx[d] += 1;
                if idx[d] < shape[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: Element> NdArray<T> {
    pub fn view(&self) -> NdView<'_, Vec<T>> {
        NdView {
            data: &self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: 0,
        }
    }

    pub fn view_mut(&mut self) -> NdViewMut<'_, Vec<T>> {
        NdViewMut {
            data: &mut self.data,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: 0,
        }
    }
}

impl<T> Index<&[usize]> for NdArray<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        assert_eq!(index.len(), self.ndim(), "index rank mismatch");
        for (&i, &d) in index.iter().zip(&self.shape) {
            assert!(i < d, "index out of bounds");
        }
        &self.data[offset_of(index, &self.strides, 0)]
    }
}

impl<T> IndexMut<&[usize]> for NdArray<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        assert_eq!(index.len(), self.ndim(), "index rank mismatch");
        for (&i, &d) in index.iter().zip(&self.shape) {
            assert!(i < d, "index out of bounds");
        }
        let flat = offset_of(index, &self.strides, 0);
        &mut self.data[flat]
    }
}
