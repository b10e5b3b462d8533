//! Broadcasting engine.
//!
//! Shapes are right-aligned and shorter shapes are padded with leading 1s.
//! Per dimension the sizes must be equal or 1, and the output takes the non-1
//! size. A size of 0 wins over every other size: the result is empty in that
//! dimension, which is never an error.
//!
//! An operand that is stretched along a dimension gets stride 0 there, so
//! every index along that axis maps to the same element.

use crate::shape::{numel, row_major_strides};
use crate::{Result, StridedError};

/// Output shape plus the effective strides of every input, computed per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlan {
    /// Broadcast output shape.
    pub shape: Vec<usize>,
    /// Effective row-major strides of each input over `shape`. Stretched and
    /// padded leading dimensions are 0.
    pub strides: Vec<Vec<isize>>,
}

impl BroadcastPlan {
    /// Rank of the output.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of output elements.
    #[inline]
    pub fn len(&self) -> usize {
        numel(&self.shape)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of `index` into input `operand`.
    pub fn offset(&self, operand: usize, index: &[usize]) -> usize {
        crate::shape::offset_of(index, &self.strides[operand], 0)
    }
}

#[inline]
fn padded_dim(shape: &[usize], rank: usize, d: usize) -> usize {
    let pad = rank - shape.len();
    if d < pad {
        1
    } else {
        shape[d - pad]
    }
}

/// Compute the common broadcast shape of `shapes`.
///
/// # Errors
/// Returns [`StridedError::IncompatibleShapes`] if two right-aligned sizes
/// differ and both are greater than 1.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let rank = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; rank];
    for (d, slot) in out.iter_mut().enumerate() {
        let mut target = 1usize;
        let mut owner = 0usize;
        for (k, shape) in shapes.iter().enumerate() {
            let n = padded_dim(shape, rank, d);
            if n == 1 || n == target {
                continue;
            }
            if target == 1 {
                target = n;
                owner = k;
            } else if n == 0 || target == 0 {
                target = 0;
                owner = k;
            } else {
                log::debug!(
                    "cannot broadcast {:?} with {:?} (dimension {d}: {target} vs {n})",
                    shapes[owner],
                    shape
                );
                return Err(StridedError::IncompatibleShapes(
                    shapes[owner].to_vec(),
                    shape.to_vec(),
                ));
            }
        }
        *slot = target;
    }
    Ok(out)
}

/// Promote `strides` of an array of `shape` to the broadcast `target` shape.
///
/// Leading padded dimensions and stretched dimensions get stride 0; every
/// other dimension keeps its stride.
///
/// # Errors
/// - [`StridedError::RankMismatch`] if `shape` has more dimensions than `target`
/// - [`StridedError::StrideLengthMismatch`] if `strides` and `shape` differ in length
/// - [`StridedError::IncompatibleShapes`] if `shape` cannot be stretched to `target`
pub fn broadcast_strides(target: &[usize], shape: &[usize], strides: &[isize]) -> Result<Vec<isize>> {
    if shape.len() > target.len() {
        return Err(StridedError::RankMismatch(shape.len(), target.len()));
    }
    if strides.len() != shape.len() {
        return Err(StridedError::StrideLengthMismatch);
    }

    let pad = target.len() - shape.len();
    let mut out = vec![0isize; target.len()];
    for i in 0..shape.len() {
        let sdim = shape[i];
        let tdim = target[pad + i];
        out[pad + i] = if sdim == tdim || tdim == 0 {
            strides[i]
        } else if sdim == 1 {
            0
        } else {
            return Err(StridedError::IncompatibleShapes(
                shape.to_vec(),
                target.to_vec(),
            ));
        };
    }
    Ok(out)
}

/// Build a [`BroadcastPlan`] for row-major contiguous inputs of the given shapes.
pub fn plan(shapes: &[&[usize]]) -> Result<BroadcastPlan> {
    let shape = broadcast_shapes(shapes)?;
    let strides = shapes
        .iter()
        .map(|s| broadcast_strides(&shape, s, &row_major_strides(s)))
        .collect::<Result<Vec<_>>>()?;
    log::trace!("broadcast plan: {shapes:?} -> {shape:?}");
    Ok(BroadcastPlan { shape, strides })
}
