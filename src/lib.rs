//! Dtype-aware dispatch, broadcasting and element-wise kernels for flat array storage.
//!
//! The crate covers one recurring pattern: applying an element-wise operation
//! uniformly across many storage representations (typed vectors, slices,
//! interleaved complex buffers, user storages with their own get/set) without
//! a per-element dynamic lookup.
//!
//! # Core Types
//!
//! - [`DataType`]: dtype registry with classification queries and the
//!   [`cast_safety`] table
//! - [`ArrayLike`]: capability trait of an array storage; [`resolve`] turns it
//!   into a [`Resolved`] getter/setter pair once per operation
//! - [`NdView`] / [`NdViewMut`]: rank-N strided views over any [`ArrayLike`]
//! - [`NdArray`]: owned row-major array produced by builders and allocating kernels
//!
//! # Kernels
//!
//! - [`map_into`], [`zip_map2_into`] .. [`zip_map5_into`]: fixed-arity kernels
//!   over mixed storages
//! - [`apply_into`], [`try_apply_into`], [`apply_by_into`], [`map_by_into`]:
//!   N-ary kernels, optionally fallible or with an accessor override
//! - [`map`], [`zip_map2`], [`apply`]: allocating variants
//!
//! Inputs are broadcast to the output shape with NumPy rules ([`plan`],
//! [`broadcast_shapes`]).
//!
//! # Example
//!
//! ```rust
//! use strided_dispatch::{zip_map2, NdView};
//!
//! let x = vec![1.0, 2.0, 3.0];
//! let y = vec![10.0, 20.0, 30.0];
//! let row = NdView::row_major(&x, &[1, 3]).unwrap();
//! let col = NdView::row_major(&y, &[3, 1]).unwrap();
//!
//! let out = zip_map2(&row, &col, |a, b| a + b).unwrap();
//! assert_eq!(out.shape(), &[3, 3]);
//! assert_eq!(out[&[2, 0][..]], 31.0);
//! ```
//!
//! # Flat utilities
//!
//! ```rust
//! use strided_dispatch::{fill, indices_complement, reverse};
//!
//! let mut x = vec![0, 1, 2, 3, 4, 5];
//! fill(&mut x, 10, 2, 4);
//! assert_eq!(x, [0, 1, 10, 10, 4, 5]);
//!
//! reverse(&mut x);
//! assert_eq!(x, [5, 4, 10, 10, 1, 0]);
//!
//! assert_eq!(indices_complement(5, &[1, 2]), [0, 3, 4]);
//! ```

pub mod accessor;
pub mod broadcast;
mod builders;
pub mod cast;
pub mod dtype;
mod kernel;
mod map;
mod nested;
mod ops;
mod pod_complex;
pub mod shape;
pub mod view;

// ============================================================================
// Registry
// ============================================================================
pub use cast::{
    cast_safety, casts_from, is_allowed_cast, is_mostly_safe_cast, is_safe_cast,
    is_same_kind_cast, CastSafety, Casting,
};
pub use dtype::{classify, Category, DataType, Element};

// ============================================================================
// Accessors and storage
// ============================================================================
pub use accessor::{resolve, AccessorPair, ArrayLike, ComplexArray, Protocol, Resolved};
pub use pod_complex::{as_pairs, as_pairs_mut, ComplexComponent, PodComplexF32, PodComplexF64};

// ============================================================================
// Shapes, views and broadcasting
// ============================================================================
pub use broadcast::{broadcast_shapes, broadcast_strides, plan, BroadcastPlan};
pub use shape::Order;
pub use view::{NdArray, NdView, NdViewMut};

// ============================================================================
// Kernels
// ============================================================================
pub use map::{
    apply, apply_by_into, apply_into, map, map_by_into, map_into, try_apply_into, zip_map2,
    zip_map2_into, zip_map3_into, zip_map4_into, zip_map5_into,
};

// ============================================================================
// Builders and flat utilities
// ============================================================================
pub use builders::{filled, filled_by, ones, zeros};
pub use nested::{filled_nested, Nested};
pub use ops::{copy_into, copy_view_into, fill, first, indices_complement, last, reverse, to_reversed};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by registry queries, broadcasting and the kernels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StridedError {
    /// A dtype string names no known data type.
    #[error("unknown data type: {0:?}")]
    UnknownDataType(String),

    /// Shapes cannot be reconciled under broadcasting rules.
    #[error("incompatible shapes: {0:?} vs {1:?}")]
    IncompatibleShapes(Vec<usize>, Vec<usize>),

    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes differ where identical shapes are required.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// A mutable view would alias several indices to one element.
    #[error("invalid stride 0 for dim {dim}")]
    ZeroStride { dim: usize },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// A view reaches outside its buffer, or its offsets overflow.
    #[error("offset out of bounds or overflowed")]
    OffsetOverflow,

    /// Buffer length does not match what the shape or operation requires.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Sibling sub-arrays of a nested array differ in length or depth.
    #[error("ragged nested array")]
    RaggedNested,
}

/// Result type for this crate's operations.
pub type Result<T> = std::result::Result<T, StridedError>;
