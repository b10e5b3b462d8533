//! Accessor resolution.
//!
//! Every array storage implements [`ArrayLike`], which exposes its dtype tag,
//! whether elements are reached by plain indexing or through the storage's
//! own get/set methods, and the matching [`AccessorPair`]. [`resolve`] reads
//! only these static capabilities, so it is O(1) and never touches element 0.
//! Kernels resolve each operand once and then call the returned function
//! pointers per element.

use bytemuck::Zeroable;
use num_complex::Complex;

use crate::dtype::{DataType, Element};
use crate::pod_complex::{as_pairs, pairs_as_components, ComplexComponent};
use crate::Result;

/// How elements of an array are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// One logical element per physical slot; direct indexing.
    Indexed,
    /// Element access goes through the storage's get/set methods.
    Accessor,
}

/// A matched getter/setter pair for one storage type.
pub struct AccessorPair<A: ArrayLike + ?Sized> {
    pub get: fn(&A, usize) -> A::Elem,
    pub set: fn(&mut A, usize, A::Elem),
}

impl<A: ArrayLike + ?Sized> Clone for AccessorPair<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ArrayLike + ?Sized> Copy for AccessorPair<A> {}

/// Capability interface of an array storage.
///
/// Implementors describe themselves statically; nothing here may depend on
/// element values.
pub trait ArrayLike {
    /// Logical element type.
    type Elem;

    /// Element access protocol of this storage.
    const PROTOCOL: Protocol;

    /// Number of logical elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Explicit dtype tag of this array.
    fn dtype(&self) -> DataType;

    /// Getter/setter pair specialized for this storage.
    fn accessors() -> AccessorPair<Self>;
}

// ============================================================================
// Indexed storage
// ============================================================================

#[inline(always)]
fn slice_get<T: Clone>(x: &[T], i: usize) -> T {
    x[i].clone()
}

#[inline(always)]
fn slice_set<T>(x: &mut [T], i: usize, value: T) {
    x[i] = value;
}

#[inline(always)]
fn vec_get<T: Clone>(x: &Vec<T>, i: usize) -> T {
    x[i].clone()
}

#[inline(always)]
fn vec_set<T>(x: &mut Vec<T>, i: usize, value: T) {
    x[i] = value;
}

impl<T: Element> ArrayLike for [T] {
    type Elem = T;
    const PROTOCOL: Protocol = Protocol::Indexed;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn dtype(&self) -> DataType {
        T::DTYPE
    }

    fn accessors() -> AccessorPair<Self> {
        AccessorPair {
            get: slice_get::<T>,
            set: slice_set::<T>,
        }
    }
}

impl<T: Element> ArrayLike for Vec<T> {
    type Elem = T;
    const PROTOCOL: Protocol = Protocol::Indexed;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn dtype(&self) -> DataType {
        T::DTYPE
    }

    fn accessors() -> AccessorPair<Self> {
        AccessorPair {
            get: vec_get::<T>,
            set: vec_set::<T>,
        }
    }
}

// ============================================================================
// Interleaved complex storage
// ============================================================================

/// Complex array backed by an interleaved real buffer `[re0, im0, re1, im1, ...]`.
///
/// One logical element spans two physical slots, so this storage always uses
/// the accessor protocol. The buffer is held as POD `[re, im]` pairs and
/// reinterpreted as plain components on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexArray<F: ComplexComponent> {
    pairs: Vec<F::Pair>,
}

impl<F: ComplexComponent> ComplexArray<F> {
    /// A zero-filled array of `len` complex elements.
    pub fn zeros(len: usize) -> Self {
        Self {
            pairs: vec![<F::Pair as Zeroable>::zeroed(); len],
        }
    }

    /// Wrap an interleaved buffer.
    ///
    /// # Errors
    /// Returns [`StridedError::LengthMismatch`](crate::StridedError::LengthMismatch)
    /// if `buf` has odd length.
    pub fn from_interleaved(buf: Vec<F>) -> Result<Self> {
        Ok(Self {
            pairs: as_pairs(&buf)?.to_vec(),
        })
    }

    /// Copy complex values into interleaved storage.
    pub fn from_complex(values: &[Complex<F>]) -> Self {
        Self {
            pairs: values.iter().map(|&c| c.into()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Read element `i`, i.e. slots `2i` and `2i + 1`.
    #[inline]
    pub fn get(&self, i: usize) -> Complex<F> {
        self.pairs[i].into()
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: Complex<F>) {
        self.pairs[i] = value.into();
    }

    pub fn as_interleaved(&self) -> &[F] {
        pairs_as_components::<F>(&self.pairs)
    }

    pub fn into_interleaved(self) -> Vec<F> {
        self.as_interleaved().to_vec()
    }

    pub fn to_vec(&self) -> Vec<Complex<F>> {
        self.pairs.iter().map(|&p| p.into()).collect()
    }
}

impl<F: ComplexComponent> ArrayLike for ComplexArray<F> {
    type Elem = Complex<F>;
    const PROTOCOL: Protocol = Protocol::Accessor;

    #[inline]
    fn len(&self) -> usize {
        ComplexArray::len(self)
    }

    #[inline]
    fn dtype(&self) -> DataType {
        F::COMPLEX_DTYPE
    }

    fn accessors() -> AccessorPair<Self> {
        AccessorPair {
            get: ComplexArray::get,
            set: ComplexArray::set,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Result of [`resolve`]: dtype, protocol and the accessor pair of one array.
pub struct Resolved<A: ArrayLike + ?Sized> {
    pub dtype: DataType,
    pub protocol: Protocol,
    pub accessors: AccessorPair<A>,
}

impl<A: ArrayLike + ?Sized> Clone for Resolved<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ArrayLike + ?Sized> Copy for Resolved<A> {}

impl<A: ArrayLike + ?Sized> std::fmt::Debug for Resolved<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("dtype", &self.dtype)
            .field("protocol", &self.protocol)
            .finish()
    }
}

impl<A: ArrayLike + ?Sized> Resolved<A> {
    #[inline(always)]
    pub fn get(&self, array: &A, index: usize) -> A::Elem {
        (self.accessors.get)(array, index)
    }

    #[inline(always)]
    pub fn set(&self, array: &mut A, index: usize, value: A::Elem) {
        (self.accessors.set)(array, index, value)
    }

    /// Replace the getter, keeping dtype, protocol and setter.
    pub fn with_getter(mut self, get: fn(&A, usize) -> A::Elem) -> Self {
        self.accessors.get = get;
        self
    }
}

/// Determine the dtype, protocol and accessor pair of `array`.
///
/// Only static capabilities are inspected; empty arrays resolve like any other.
pub fn resolve<A: ArrayLike + ?Sized>(array: &A) -> Resolved<A> {
    let dtype = array.dtype();
    let protocol = A::PROTOCOL;
    log::trace!("resolved accessors: dtype={dtype} protocol={protocol:?}");
    Resolved {
        dtype,
        protocol,
        accessors: A::accessors(),
    }
}
