//! Shape and stride helpers for flat buffers.

use crate::{Result, StridedError};

/// Memory layout of a freshly allocated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Order {
    /// Last index varies fastest (C order).
    #[default]
    RowMajor,
    /// First index varies fastest (Fortran order).
    ColumnMajor,
}

/// Number of elements described by `shape`. The empty shape holds one element.
#[inline]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(shape: &[usize]) -> Vec<isize> {
    let rank = shape.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1] * shape[i - 1] as isize;
    }
    strides
}

/// Compute row-major strides (last index varies fastest).
pub fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let rank = shape.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1] as isize;
    }
    strides
}

/// Strides of a contiguous buffer of `shape` in the given order.
pub fn strides_for(shape: &[usize], order: Order) -> Vec<isize> {
    match order {
        Order::RowMajor => row_major_strides(shape),
        Order::ColumnMajor => col_major_strides(shape),
    }
}

/// Returns true if `strides` describe a gap-free row-major walk over `shape`.
///
/// Dimensions of size 1 are ignored, so a broadcast view is contiguous only
/// when none of its stretched axes is longer than 1.
pub fn is_row_major_contiguous(shape: &[usize], strides: &[isize]) -> bool {
    let mut expected = 1isize;
    for (&dim, &stride) in shape.iter().zip(strides).rev() {
        if dim <= 1 {
            continue;
        }
        if stride != expected {
            return false;
        }
        expected *= dim as isize;
    }
    true
}

/// Flat buffer offset of a multi-index.
#[inline]
pub fn offset_of(index: &[usize], strides: &[isize], offset: usize) -> usize {
    let mut idx = offset as isize;
    for (&i, &s) in index.iter().zip(strides) {
        idx += i as isize * s;
    }
    idx as usize
}

/// Validate that every offset reachable through `(shape, strides, offset)`
/// lies in `[0, len)`.
pub fn validate_bounds(len: usize, shape: &[usize], strides: &[isize], offset: usize) -> Result<()> {
    if shape.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    if shape.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let offset = isize::try_from(offset).map_err(|_| StridedError::OffsetOverflow)?;
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in shape.iter().zip(strides) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StridedError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset as usize >= len {
        return Err(StridedError::OffsetOverflow);
    }
    Ok(())
}
