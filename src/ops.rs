//! Flat utilities built on accessor resolution.
//!
//! Each function resolves its operands once and then works through the
//! resolved getter/setter, so typed vectors, slices and interleaved complex
//! storage all behave the same.

use crate::accessor::{resolve, ArrayLike};
use crate::kernel::ensure_same_shape;
use crate::map::map_into;
use crate::view::{NdView, NdViewMut};
use crate::{Result, StridedError};

/// Clamp a possibly negative bound to `[0, len]`; negative values count from the end.
#[inline]
fn clamp_bound(bound: isize, len: usize) -> usize {
    if bound < 0 {
        len.saturating_sub(bound.unsigned_abs())
    } else {
        (bound as usize).min(len)
    }
}

/// Overwrite the half-open range `[start, end)` of `x` with `value`.
///
/// Negative bounds count from the end; both bounds are clamped to the array,
/// and an empty or inverted range leaves `x` untouched.
pub fn fill<A>(x: &mut A, value: A::Elem, start: isize, end: isize)
where
    A: ArrayLike + ?Sized,
    A::Elem: Clone,
{
    let len = x.len();
    let (start, end) = (clamp_bound(start, len), clamp_bound(end, len));
    let r = resolve(&*x);
    for i in start..end {
        r.set(x, i, value.clone());
    }
}

/// Reverse `x` in place.
pub fn reverse<A: ArrayLike + ?Sized>(x: &mut A) {
    let len = x.len();
    let r = resolve(&*x);
    for i in 0..len / 2 {
        let j = len - 1 - i;
        let a = r.get(x, i);
        let b = r.get(x, j);
        r.set(x, i, b);
        r.set(x, j, a);
    }
}

/// Elements of `x` in reverse order.
pub fn to_reversed<A: ArrayLike + ?Sized>(x: &A) -> Vec<A::Elem> {
    let r = resolve(x);
    (0..x.len()).rev().map(|i| r.get(x, i)).collect()
}

/// Ascending indices in `0..n` that do not appear in `indices`.
///
/// Indices outside `0..n` are ignored.
pub fn indices_complement(n: usize, indices: &[usize]) -> Vec<usize> {
    let mut taken = vec![false; n];
    for &i in indices {
        if i < n {
            taken[i] = true;
        }
    }
    taken
        .iter()
        .enumerate()
        .filter_map(|(i, &t)| (!t).then_some(i))
        .collect()
}

pub fn first<A: ArrayLike + ?Sized>(x: &A) -> Option<A::Elem> {
    if x.is_empty() {
        return None;
    }
    Some(resolve(x).get(x, 0))
}

pub fn last<A: ArrayLike + ?Sized>(x: &A) -> Option<A::Elem> {
    if x.is_empty() {
        return None;
    }
    Some(resolve(x).get(x, x.len() - 1))
}

/// Copy every element of `src` into `dst`.
///
/// The storages may differ as long as their element types agree.
///
/// # Errors
/// Returns [`StridedError::LengthMismatch`] if the lengths differ.
pub fn copy_into<S, D>(dst: &mut D, src: &S) -> Result<()>
where
    S: ArrayLike<Elem = D::Elem> + ?Sized,
    D: ArrayLike + ?Sized,
{
    if dst.len() != src.len() {
        return Err(StridedError::LengthMismatch {
            expected: dst.len(),
            actual: src.len(),
        });
    }
    let (rs, rd) = (resolve(src), resolve(&*dst));
    for i in 0..src.len() {
        rd.set(dst, i, rs.get(src, i));
    }
    Ok(())
}

/// Copy a strided view into a destination of exactly the same shape.
///
/// Unlike [`map_into`], no broadcasting is performed.
///
/// # Errors
/// Returns [`StridedError::RankMismatch`] or [`StridedError::ShapeMismatch`]
/// if the shapes differ.
pub fn copy_view_into<A, O>(dest: &mut NdViewMut<'_, O>, src: &NdView<'_, A>) -> Result<()>
where
    A: ArrayLike<Elem = O::Elem> + ?Sized,
    O: ArrayLike + ?Sized,
{
    ensure_same_shape(dest.shape(), src.shape())?;
    map_into(dest, src, |x| x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::ComplexArray;
    use num_complex::Complex32;

    #[test]
    fn test_fill_half_open() {
        let mut x = vec![0, 1, 2, 3, 4, 5];
        fill(&mut x, 10, 2, 4);
        assert_eq!(x, vec![0, 1, 10, 10, 4, 5]);
    }

    #[test]
    fn test_fill_negative_and_clamped_bounds() {
        let mut x = vec![0u8; 5];
        fill(&mut x, 1, -2, 100);
        assert_eq!(x, vec![0, 0, 0, 1, 1]);

        fill(&mut x, 7, -100, 1);
        assert_eq!(x, vec![7, 0, 0, 1, 1]);

        fill(&mut x, 9, 4, 2);
        assert_eq!(x, vec![7, 0, 0, 1, 1]);
    }

    #[test]
    fn test_fill_slice_and_complex() {
        let mut buf = [1.0f32; 4];
        fill(&mut buf[..], 0.0, 1, -1);
        assert_eq!(buf, [1.0, 0.0, 0.0, 1.0]);

        let mut z = ComplexArray::<f32>::zeros(3);
        fill(&mut z, Complex32::new(1.0, -1.0), 1, 3);
        assert_eq!(z.as_interleaved(), &[0.0, 0.0, 1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_reverse() {
        let mut x = vec![0, 1, 2, 3, 4, 5];
        reverse(&mut x);
        assert_eq!(x, vec![5, 4, 3, 2, 1, 0]);
        reverse(&mut x);
        assert_eq!(x, vec![0, 1, 2, 3, 4, 5]);

        let mut odd = vec!['a', 'b', 'c'];
        reverse(&mut odd);
        assert_eq!(odd, vec!['c', 'b', 'a']);
        assert_eq!(to_reversed(&odd), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_reverse_complex() {
        let mut z = ComplexArray::from_complex(&[Complex32::new(1.0, 2.0), Complex32::new(3.0, 4.0)]);
        reverse(&mut z);
        assert_eq!(z.as_interleaved(), &[3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_indices_complement() {
        assert_eq!(indices_complement(5, &[1, 2]), vec![0, 3, 4]);
        assert_eq!(indices_complement(4, &[3, 3, 0, 9]), vec![1, 2]);
        assert!(indices_complement(0, &[]).is_empty());
        assert_eq!(indices_complement(3, &[]), vec![0, 1, 2]);
    }

    #[test]
    fn test_first_last() {
        let x = vec![4i64, 5, 6];
        assert_eq!(first(&x), Some(4));
        assert_eq!(last(&x), Some(6));
        let empty: Vec<i64> = Vec::new();
        assert_eq!(first(&empty), None);
        assert_eq!(last(&empty), None);
    }

    #[test]
    fn test_copy_into() {
        let src = vec![Complex32::new(1.0, 1.0), Complex32::new(2.0, 0.0)];
        let mut dst = ComplexArray::<f32>::zeros(2);
        copy_into(&mut dst, &src).unwrap();
        assert_eq!(dst.to_vec(), src);

        let mut short = vec![Complex32::new(0.0, 0.0)];
        assert!(matches!(
            copy_into(&mut short, &src),
            Err(StridedError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_copy_view_into_requires_same_shape() {
        let src = vec![1, 2, 3, 4, 5, 6];
        let sv = NdView::row_major(&src, &[2, 3]).unwrap();
        let mut out = vec![0; 6];
        {
            let mut dv = NdViewMut::row_major(&mut out, &[3, 2]).unwrap();
            assert!(matches!(
                copy_view_into(&mut dv, &sv),
                Err(StridedError::ShapeMismatch(_, _))
            ));
        }
        let mut dv = NdViewMut::row_major(&mut out, &[3, 2]).unwrap();
        copy_view_into(&mut dv, &sv.permute(&[1, 0]).unwrap()).unwrap();
        assert_eq!(out, vec![1, 4, 2, 5, 3, 6]);
    }
}
