//! Element-wise kernels.
//!
//! Every kernel resolves the accessors of each operand once, stretches each
//! input to the output shape with the broadcasting engine, and then walks the
//! output index space in row-major order. Equal shapes are the degenerate
//! case: no dimension is stretched and the walk is a plain strided loop.
//!
//! Callbacks are never caught. A panicking callback unwinds out of the kernel;
//! a fallible callback passed to [`try_apply_into`] stops the walk at its
//! first error. Elements written before that point stay written.

use crate::accessor::{resolve, ArrayLike};
use crate::broadcast::{broadcast_shapes, broadcast_strides};
use crate::kernel::for_each_offset;
use crate::view::{NdArray, NdView, NdViewMut};
use crate::{Result, StridedError};

macro_rules! impl_zip_map_into {
    ($(#[$doc:meta])* $name:ident; $($a:ident: $A:ident => $k:tt),+) => {
        $(#[$doc])*
        pub fn $name<$($A,)+ O, F>(
            dest: &mut NdViewMut<'_, O>,
            $($a: &NdView<'_, $A>,)+
            mut f: F,
        ) -> Result<()>
        where
            $($A: ArrayLike + ?Sized,)+
            O: ArrayLike + ?Sized,
            F: FnMut($($A::Elem),+) -> O::Elem,
        {
            let target = dest.shape().to_vec();
            let dest_strides = dest.strides().to_vec();
            let src_strides = [$(broadcast_strides(&target, $a.shape(), $a.strides())?),+];
            let resolved = ($(resolve($a.data()),)+);
            let out_acc = resolve(dest.as_view().data());

            let mut strides_list: Vec<&[isize]> = vec![&dest_strides[..]];
            strides_list.extend(src_strides.iter().map(|s| &s[..]));
            let base = [dest.offset(), $($a.offset()),+];

            let out = dest.data_mut();
            for_each_offset::<StridedError, _>(&target, &strides_list, &base, |_, offs| {
                let value = f($(resolved.$k.get($a.data(), offs[$k + 1])),+);
                out_acc.set(out, offs[0], value);
                Ok(())
            })
        }
    };
}

impl_zip_map_into!(
    /// Apply `f` element-wise from `a` into `dest` (unary kernel).
    ///
    /// `a` is broadcast to the shape of `dest`.
    ///
    /// # Errors
    /// Returns [`StridedError::IncompatibleShapes`] if `a` cannot be
    /// broadcast to `dest`.
    map_into; a: A => 0
);

impl_zip_map_into!(
    /// Binary element-wise kernel: `dest[i] = f(a[i], b[i])`.
    zip_map2_into; a: A => 0, b: B => 1
);

impl_zip_map_into!(
    /// Ternary element-wise kernel.
    zip_map3_into; a: A => 0, b: B => 1, c: C => 2
);

impl_zip_map_into!(
    /// Quaternary element-wise kernel.
    zip_map4_into; a: A => 0, b: B => 1, c: C => 2, d: D => 3
);

impl_zip_map_into!(
    /// Quinary element-wise kernel.
    zip_map5_into; a: A => 0, b: B => 1, c: C => 2, d: D => 3, e: E => 4
);

// ============================================================================
// N-ary kernels over same-typed inputs
// ============================================================================

/// Shared driver of the N-ary kernels. `by` may rewrite the fetched values and
/// returns `false` to leave the output element untouched.
fn apply_core<A, O, E, F, B>(
    dest: &mut NdViewMut<'_, O>,
    inputs: &[NdView<'_, A>],
    mut f: F,
    mut by: B,
) -> std::result::Result<(), E>
where
    A: ArrayLike + ?Sized,
    O: ArrayLike + ?Sized,
    E: From<StridedError>,
    F: FnMut(&[A::Elem]) -> std::result::Result<O::Elem, E>,
    B: FnMut(&mut [A::Elem], usize) -> bool,
{
    let target = dest.shape().to_vec();
    let dest_strides = dest.strides().to_vec();
    let src_strides = inputs
        .iter()
        .map(|x| broadcast_strides(&target, x.shape(), x.strides()))
        .collect::<Result<Vec<_>>>()?;
    let resolved: Vec<_> = inputs.iter().map(|x| resolve(x.data())).collect();
    let out_acc = resolve(dest.as_view().data());

    let mut strides_list: Vec<&[isize]> = Vec::with_capacity(inputs.len() + 1);
    strides_list.push(&dest_strides);
    strides_list.extend(src_strides.iter().map(|s| &s[..]));
    let mut base = Vec::with_capacity(inputs.len() + 1);
    base.push(dest.offset());
    base.extend(inputs.iter().map(|x| x.offset()));

    let out = dest.data_mut();
    let mut values: Vec<A::Elem> = Vec::with_capacity(inputs.len());
    for_each_offset(&target, &strides_list, &base, |linear, offs| {
        values.clear();
        values.extend(
            inputs
                .iter()
                .zip(&resolved)
                .zip(&offs[1..])
                .map(|((x, r), &o)| r.get(x.data(), o)),
        );
        if !by(&mut values, linear) {
            return Ok(());
        }
        let value = f(&values)?;
        out_acc.set(out, offs[0], value);
        Ok(())
    })
}

/// N-ary element-wise kernel over inputs of one storage type.
///
/// `f` receives one value per input, in input order.
pub fn apply_into<A, O, F>(
    dest: &mut NdViewMut<'_, O>,
    inputs: &[NdView<'_, A>],
    mut f: F,
) -> Result<()>
where
    A: ArrayLike + ?Sized,
    O: ArrayLike + ?Sized,
    F: FnMut(&[A::Elem]) -> O::Elem,
{
    apply_core(dest, inputs, |v| Ok::<_, StridedError>(f(v)), |_, _| true)
}

/// [`apply_into`] with a fallible callback.
///
/// The first error returned by `f` is handed back verbatim.
pub fn try_apply_into<A, O, E, F>(
    dest: &mut NdViewMut<'_, O>,
    inputs: &[NdView<'_, A>],
    f: F,
) -> std::result::Result<(), E>
where
    A: ArrayLike + ?Sized,
    O: ArrayLike + ?Sized,
    E: From<StridedError>,
    F: FnMut(&[A::Elem]) -> std::result::Result<O::Elem, E>,
{
    apply_core(dest, inputs, f, |_, _| true)
}

/// [`apply_into`] with an accessor override.
///
/// `by` sees the values fetched for output element `linear` (row-major
/// position) and may replace them; returning `false` skips that element.
pub fn apply_by_into<A, O, F, B>(
    dest: &mut NdViewMut<'_, O>,
    inputs: &[NdView<'_, A>],
    mut f: F,
    by: B,
) -> Result<()>
where
    A: ArrayLike + ?Sized,
    O: ArrayLike + ?Sized,
    F: FnMut(&[A::Elem]) -> O::Elem,
    B: FnMut(&mut [A::Elem], usize) -> bool,
{
    apply_core(dest, inputs, |v| Ok::<_, StridedError>(f(v)), by)
}

/// Unary kernel with an accessor override.
///
/// `by` maps each fetched value (and its row-major position) to the value
/// passed to `f`; `None` leaves the output element untouched.
pub fn map_by_into<A, O, F, B>(
    dest: &mut NdViewMut<'_, O>,
    src: &NdView<'_, A>,
    mut f: F,
    mut by: B,
) -> Result<()>
where
    A: ArrayLike + ?Sized,
    O: ArrayLike + ?Sized,
    F: FnMut(A::Elem) -> O::Elem,
    B: FnMut(A::Elem, usize) -> Option<A::Elem>,
{
    let target = dest.shape().to_vec();
    let dest_strides = dest.strides().to_vec();
    let src_strides = broadcast_strides(&target, src.shape(), src.strides())?;
    let r = resolve(src.data());
    let out_acc = resolve(dest.as_view().data());
    let base = [dest.offset(), src.offset()];

    let out = dest.data_mut();
    for_each_offset::<StridedError, _>(
        &target,
        &[&dest_strides[..], &src_strides[..]],
        &base,
        |linear, offs| {
            if let Some(v) = by(r.get(src.data(), offs[1]), linear) {
                out_acc.set(out, offs[0], f(v));
            }
            Ok(())
        },
    )
}

// ============================================================================
// Allocating kernels
// ============================================================================

fn collect_into_array<U, F>(
    shape: Vec<usize>,
    strides_list: &[&[isize]],
    base: &[usize],
    mut f: F,
) -> NdArray<U>
where
    F: FnMut(&[usize]) -> U,
{
    let mut data = Vec::with_capacity(crate::shape::numel(&shape));
    let walked = for_each_offset::<StridedError, _>(&shape, strides_list, base, |_, offs| {
        data.push(f(offs));
        Ok(())
    });
    debug_assert!(walked.is_ok());
    // `data` holds exactly numel(shape) row-major values.
    match NdArray::from_vec(data, &shape) {
        Ok(array) => array,
        Err(_) => unreachable!("row-major walk produced a short buffer"),
    }
}

/// Apply `f` to every element of `x`, returning a freshly built array of the same shape.
pub fn map<A, U, F>(x: &NdView<'_, A>, mut f: F) -> NdArray<U>
where
    A: ArrayLike + ?Sized,
    F: FnMut(A::Elem) -> U,
{
    let r = resolve(x.data());
    collect_into_array(x.shape().to_vec(), &[x.strides()], &[x.offset()], |offs| {
        f(r.get(x.data(), offs[0]))
    })
}

/// Binary kernel producing a fresh array of the broadcast shape of `a` and `b`.
///
/// # Errors
/// Returns [`StridedError::IncompatibleShapes`] if the shapes do not broadcast.
pub fn zip_map2<A, B, U, F>(a: &NdView<'_, A>, b: &NdView<'_, B>, mut f: F) -> Result<NdArray<U>>
where
    A: ArrayLike + ?Sized,
    B: ArrayLike + ?Sized,
    F: FnMut(A::Elem, B::Elem) -> U,
{
    let shape = broadcast_shapes(&[a.shape(), b.shape()])?;
    let sa = broadcast_strides(&shape, a.shape(), a.strides())?;
    let sb = broadcast_strides(&shape, b.shape(), b.strides())?;
    let (ra, rb) = (resolve(a.data()), resolve(b.data()));
    Ok(collect_into_array(
        shape,
        &[&sa[..], &sb[..]],
        &[a.offset(), b.offset()],
        |offs| f(ra.get(a.data(), offs[0]), rb.get(b.data(), offs[1])),
    ))
}

/// N-ary kernel producing a fresh array of the broadcast shape of all inputs.
pub fn apply<A, U, F>(inputs: &[NdView<'_, A>], mut f: F) -> Result<NdArray<U>>
where
    A: ArrayLike + ?Sized,
    F: FnMut(&[A::Elem]) -> U,
{
    let shapes: Vec<&[usize]> = inputs.iter().map(|x| x.shape()).collect();
    let shape = broadcast_shapes(&shapes)?;
    let strides = inputs
        .iter()
        .map(|x| broadcast_strides(&shape, x.shape(), x.strides()))
        .collect::<Result<Vec<_>>>()?;
    let strides_list: Vec<&[isize]> = strides.iter().map(|s| &s[..]).collect();
    let base: Vec<usize> = inputs.iter().map(|x| x.offset()).collect();
    let resolved: Vec<_> = inputs.iter().map(|x| resolve(x.data())).collect();

    let mut values: Vec<A::Elem> = Vec::with_capacity(inputs.len());
    Ok(collect_into_array(shape, &strides_list, &base, |offs| {
        values.clear();
        values.extend(
            inputs
                .iter()
                .zip(&resolved)
                .zip(offs)
                .map(|((x, r), &o)| r.get(x.data(), o)),
        );
        f(&values)
    }))
}
