//! Kernel iteration engine.
//!
//! Walks the index space of a shape in row-major order (outer dimension
//! slowest) carrying one flat buffer offset per operand. Every element-wise
//! operation in the crate funnels through [`for_each_offset`].

use crate::shape::{is_row_major_contiguous, numel};
use crate::{Result, StridedError};

/// Check that two shapes are identical.
pub(crate) fn ensure_same_shape(a: &[usize], b: &[usize]) -> Result<()> {
    if a.len() != b.len() {
        return Err(StridedError::RankMismatch(a.len(), b.len()));
    }
    if a != b {
        return Err(StridedError::ShapeMismatch(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

#[inline]
pub(crate) fn is_contiguous(shape: &[usize], strides: &[isize]) -> bool {
    is_row_major_contiguous(shape, strides)
}

/// Visit every multi-index of `shape` in row-major order.
///
/// `strides_list[k]` and `base[k]` describe operand `k`. For each element,
/// `f` receives its linear (row-major) position and the flat offset of that
/// element in every operand. The first error returned by `f` stops the walk
/// and is passed through unchanged.
pub(crate) fn for_each_offset<E, F>(
    shape: &[usize],
    strides_list: &[&[isize]],
    base: &[usize],
    mut f: F,
) -> std::result::Result<(), E>
where
    F: FnMut(usize, &[usize]) -> std::result::Result<(), E>,
{
    debug_assert_eq!(strides_list.len(), base.len());
    let total = numel(shape);
    if total == 0 {
        return Ok(());
    }

    let n = strides_list.len();
    let mut offsets: Vec<usize> = base.to_vec();

    if strides_list.iter().all(|s| is_contiguous(shape, s)) {
        for linear in 0..total {
            for k in 0..n {
                offsets[k] = base[k] + linear;
            }
            f(linear, &offsets)?;
        }
        return Ok(());
    }

    let rank = shape.len();
    let inner_len = shape[rank - 1];
    let inner_strides: Vec<isize> = strides_list.iter().map(|s| s[rank - 1]).collect();
    let outer = &shape[..rank - 1];

    let mut row_start: Vec<isize> = base.iter().map(|&b| b as isize).collect();
    let mut pos = row_start.clone();
    let mut idx = vec![0usize; outer.len()];
    let mut linear = 0usize;

    loop {
        pos.copy_from_slice(&row_start);
        for _ in 0..inner_len {
            for k in 0..n {
                offsets[k] = pos[k] as usize;
            }
            f(linear, &offsets)?;
            linear += 1;
            for k in 0..n {
                pos[k] += inner_strides[k];
            }
        }

        // Odometer over the outer dimensions.
        let mut d = outer.len();
        loop {
            if d == 0 {
                return Ok(());
            }
            d -= 1;
            idx[d] += 1;
            for k in 0..n {
                row_start[k] += strides_list[k][d];
            }
            if idx[d] < outer[d] {
                break;
            }
            for k in 0..n {
                row_start[k] -= strides_list[k][d] * outer[d] as isize;
            }
            idx[d] = 0;
        }
    }
}
