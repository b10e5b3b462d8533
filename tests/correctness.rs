use approx::assert_relative_eq;
use num_complex::{Complex32, Complex64};
use std::cell::Cell;
use strided_dispatch::{
    apply, apply_by_into, apply_into, cast_safety, classify, fill, filled, filled_nested,
    indices_complement, map, map_by_into, map_into, plan, resolve, reverse, to_reversed,
    try_apply_into, zeros, zip_map2, zip_map2_into, zip_map3_into, AccessorPair, ArrayLike, CastSafety,
    Category, ComplexArray, DataType, Element, NdArray, NdView, NdViewMut, Nested, Protocol, StridedError,
};

fn make_matrix(rows: usize, cols: usize) -> NdArray<f64> {
    NdArray::from_fn(&[rows, cols], |idx| (idx[0] * cols + idx[1]) as f64)
}

#[test]
fn test_map_into_transposed() {
    let a = make_matrix(8, 5);
    let a_t = a.view().permute(&[1, 0]).unwrap();
    let mut out = zeros::<f64>(&[5, 8]);

    map_into(&mut out.view_mut(), &a_t, |x| x * 2.0).unwrap();

    for i in 0..5 {
        for j in 0..8 {
            assert_relative_eq!(out[&[i, j][..]], 2.0 * a[&[j, i][..]], epsilon = 1e-10);
        }
    }
}

#[test]
fn test_zip_map2_mixed_strides() {
    let a = make_matrix(6, 4);
    let b = make_matrix(4, 6);
    let a_t = a.view().permute(&[1, 0]).unwrap();
    let mut out = zeros::<f64>(&[4, 6]);

    zip_map2_into(&mut out.view_mut(), &a_t, &b.view(), |x, y| x + y).unwrap();

    for i in 0..4 {
        for j in 0..6 {
            assert_relative_eq!(
                out[&[i, j][..]],
                a[&[j, i][..]] + b[&[i, j][..]],
                epsilon = 1e-10
            );
        }
    }
}

#[test]
fn test_identity_round_trip() {
    let x = NdArray::from_fn(&[3, 4, 2], |idx| {
        (idx[0] * 100 + idx[1] * 10 + idx[2]) as f32 * 0.5
    });
    let blank = zeros::<f32>(&[3, 4, 2]);
    let mut y = zeros::<f32>(&[3, 4, 2]);

    zip_map2_into(&mut y.view_mut(), &x.view(), &blank.view(), |a, _| a).unwrap();
    assert_eq!(x, y);
}

#[test]
fn test_idempotent_apply() {
    let a = make_matrix(5, 7);
    let b = NdArray::from_fn(&[7], |idx| idx[0] as f64 * 0.25 - 1.0);
    let inputs = [a.view(), b.view()];

    let mut first = zeros::<f64>(&[5, 7]);
    let mut second = zeros::<f64>(&[5, 7]);
    apply_into(&mut first.view_mut(), &inputs, |v| v[0].sin() * v[1]).unwrap();
    apply_into(&mut second.view_mut(), &inputs, |v| v[0].sin() * v[1]).unwrap();

    for (p, q) in first.iter().zip(second.iter()) {
        assert_eq!(p.to_bits(), q.to_bits());
    }
}

#[test]
fn test_row_plus_column_broadcast() {
    let x = vec![1.0, 2.0, 3.0];
    let y = vec![10.0, 20.0, 30.0];
    let xv = NdView::row_major(&x, &[1, 3]).unwrap();
    let yv = NdView::row_major(&y, &[3, 1]).unwrap();

    let p = plan(&[xv.shape(), yv.shape()]).unwrap();
    assert_eq!(p.shape, vec![3, 3]);

    let mut out = zeros::<f64>(&p.shape);
    zip_map2_into(&mut out.view_mut(), &xv, &yv, |a, b| a + b).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(out[&[i, j][..]], x[j] + y[i]);
        }
    }

    let allocated = zip_map2(&xv, &yv, |a, b| a + b).unwrap();
    assert_eq!(allocated, out);
}

#[test]
fn test_incompatible_shapes_reported() {
    let a = zeros::<i32>(&[2, 3]);
    let b = zeros::<i32>(&[3, 2]);
    let err = zip_map2(&a.view(), &b.view(), |x, y| x + y).unwrap_err();
    assert_eq!(err, StridedError::IncompatibleShapes(vec![2, 3], vec![3, 2]));
}

#[test]
fn test_ternary_over_complex_storage() {
    let re = vec![1.0, 2.0];
    let im = vec![0.5, -0.5];
    let scale = vec![2.0];
    let mut z = ComplexArray::<f64>::zeros(2);

    zip_map3_into(
        &mut NdViewMut::from_array(&mut z),
        &NdView::from_array(&re),
        &NdView::from_array(&im),
        &NdView::from_array(&scale),
        |r, i, s| Complex64::new(r * s, i * s),
    )
    .unwrap();

    assert_eq!(z.as_interleaved(), &[2.0, 1.0, 4.0, -1.0]);
    let norms = map(&NdView::from_array(&z), |c| c.norm_sqr());
    assert_relative_eq!(norms.data()[1], 17.0, epsilon = 1e-12);
}

#[test]
fn test_empty_arrays_never_touch_accessors() {
    let mut calls = 0;
    let empty: Vec<f64> = Vec::new();
    let view = NdView::row_major(&empty, &[0, 4]).unwrap();
    let out = map(&view, |x| {
        calls += 1;
        x
    });
    assert!(out.is_empty());
    assert_eq!(calls, 0);

    for dtype in DataType::ALL {
        assert_eq!(dtype.to_string().parse::<DataType>().unwrap(), dtype);
    }
    let empty_c = ComplexArray::<f64>::zeros(0);
    let r = resolve(&empty_c);
    assert_eq!(r.dtype, DataType::Complex128);
    assert_eq!(r.protocol, Protocol::Accessor);
    assert_eq!(empty_c.len(), 0);
}

fn assert_empty_resolves<A: ArrayLike + ?Sized>(x: &A, dtype: DataType, protocol: Protocol) {
    let r = resolve(x);
    assert_eq!(r.dtype, dtype);
    assert_eq!(r.protocol, protocol);
    assert!(x.is_empty());
}

#[derive(Clone)]
struct Label;
impl Element for Label {}

#[test]
fn test_empty_arrays_resolve_for_every_dtype() {
    use Protocol::{Accessor, Indexed};

    assert_empty_resolves(&Vec::<f64>::new(), DataType::Float64, Indexed);
    assert_empty_resolves(&Vec::<f32>::new(), DataType::Float32, Indexed);
    assert_empty_resolves(&Vec::<i32>::new(), DataType::Int32, Indexed);
    assert_empty_resolves(&Vec::<i16>::new(), DataType::Int16, Indexed);
    assert_empty_resolves(&Vec::<i8>::new(), DataType::Int8, Indexed);
    assert_empty_resolves(&Vec::<u32>::new(), DataType::Uint32, Indexed);
    assert_empty_resolves(&Vec::<u16>::new(), DataType::Uint16, Indexed);
    assert_empty_resolves(&Vec::<u8>::new(), DataType::Uint8, Indexed);
    assert_empty_resolves(&Vec::<bool>::new(), DataType::Bool, Indexed);
    assert_empty_resolves(&Vec::<Complex64>::new(), DataType::Complex128, Indexed);
    assert_empty_resolves(&Vec::<Complex32>::new(), DataType::Complex64, Indexed);
    assert_empty_resolves(&ComplexArray::<f64>::zeros(0), DataType::Complex128, Accessor);
    assert_empty_resolves(&ComplexArray::<f32>::zeros(0), DataType::Complex64, Accessor);
    assert_empty_resolves(&Vec::<Label>::new(), DataType::Generic, Indexed);
    assert_empty_resolves(&[0u8; 0][..], DataType::Uint8, Indexed);
}

/// Accessor-protocol storage that counts every get and set.
struct Tally {
    data: Vec<f64>,
    gets: Cell<usize>,
    sets: Cell<usize>,
}

impl Tally {
    fn new(len: usize) -> Self {
        Tally {
            data: vec![0.0; len],
            gets: Cell::new(0),
            sets: Cell::new(0),
        }
    }

    fn get(&self, i: usize) -> f64 {
        self.gets.set(self.gets.get() + 1);
        self.data[i]
    }

    fn set(&mut self, i: usize, value: f64) {
        self.sets.set(self.sets.get() + 1);
        self.data[i] = value;
    }
}

impl ArrayLike for Tally {
    type Elem = f64;
    const PROTOCOL: Protocol = Protocol::Accessor;

    fn len(&self) -> usize {
        self.data.len()
    }

    fn dtype(&self) -> DataType {
        DataType::Float64
    }

    fn accessors() -> AccessorPair<Self> {
        AccessorPair {
            get: Tally::get,
            set: Tally::set,
        }
    }
}

#[test]
fn test_empty_accessor_storage_is_never_read_or_written() {
    for shape in [&[0][..], &[0, 3][..], &[3, 0][..]] {
        let src = Tally::new(0);
        let mut dst = Tally::new(0);
        let mut calls = 0;

        {
            let x = NdView::row_major(&src, shape).unwrap();
            let mut out = NdViewMut::row_major(&mut dst, shape).unwrap();
            map_into(&mut out, &x, |v| {
                calls += 1;
                v
            })
            .unwrap();
            apply_into(&mut out, &[x.clone(), x], |v| {
                calls += 1;
                v[0] + v[1]
            })
            .unwrap();
        }

        assert_eq!(calls, 0, "shape {shape:?}");
        assert_eq!(src.gets.get(), 0, "shape {shape:?}");
        assert_eq!(dst.gets.get(), 0, "shape {shape:?}");
        assert_eq!(dst.sets.get(), 0, "shape {shape:?}");
    }
}

#[test]
fn test_by_variant_skips_missing_values() {
    let x = vec![Some(1.5), None, Some(-2.0), None];
    let mut out = vec![0.0; 4];
    map_by_into(
        &mut NdViewMut::from_array(&mut out),
        &NdView::from_array(&x),
        |v| v.map_or(f64::NAN, |f| f * 2.0),
        |v, _| v.is_some().then_some(v),
    )
    .unwrap();
    assert_eq!(out, vec![3.0, 0.0, -4.0, 0.0]);

    let a = vec![1, 2, 3, 4];
    let b = vec![10, 0, 30, 0];
    let mut sums = vec![-1; 4];
    apply_by_into(
        &mut NdViewMut::from_array(&mut sums),
        &[NdView::from_array(&a), NdView::from_array(&b)],
        |v| v[0] + v[1],
        |v, _| v[1] != 0,
    )
    .unwrap();
    assert_eq!(sums, vec![11, -1, 33, -1]);
}

#[test]
fn test_callback_error_propagates_verbatim() {
    #[derive(Debug, PartialEq)]
    enum CallbackError {
        DivideByZero { at: i32 },
        Kernel(StridedError),
    }
    impl From<StridedError> for CallbackError {
        fn from(e: StridedError) -> Self {
            CallbackError::Kernel(e)
        }
    }

    let num = vec![6, 8, 10];
    let den = vec![3, 0, 5];
    let mut out = vec![0; 3];
    let res = try_apply_into(
        &mut NdViewMut::from_array(&mut out),
        &[NdView::from_array(&num), NdView::from_array(&den)],
        |v| {
            if v[1] == 0 {
                Err(CallbackError::DivideByZero { at: v[0] })
            } else {
                Ok(v[0] / v[1])
            }
        },
    );
    assert_eq!(res, Err(CallbackError::DivideByZero { at: 8 }));
    assert_eq!(out[0], 2);

    let short = vec![1, 2];
    let res = try_apply_into(
        &mut NdViewMut::from_array(&mut out),
        &[NdView::from_array(&short)],
        |v| Ok::<_, CallbackError>(v[0]),
    );
    assert!(matches!(
        res,
        Err(CallbackError::Kernel(StridedError::IncompatibleShapes(_, _)))
    ));
}

#[test]
#[should_panic(expected = "boom")]
fn test_callback_panic_is_not_caught() {
    let x = vec![1, 2, 3];
    let _ = apply(&[NdView::from_array(&x)], |v| {
        if v[0] == 2 {
            panic!("boom");
        }
        v[0]
    });
}

#[test]
fn test_fill_reverse_complement_scenarios() {
    let mut x = vec![0, 1, 2, 3, 4, 5];
    fill(&mut x, 10, 2, 4);
    assert_eq!(x, vec![0, 1, 10, 10, 4, 5]);

    let mut y = vec![0, 1, 2, 3, 4, 5];
    reverse(&mut y);
    assert_eq!(y, vec![5, 4, 3, 2, 1, 0]);
    assert_eq!(to_reversed(&y), vec![0, 1, 2, 3, 4, 5]);
    reverse(&mut y);
    assert_eq!(y, vec![0, 1, 2, 3, 4, 5]);

    assert_eq!(indices_complement(5, &[1, 2]), vec![0, 3, 4]);
}

#[test]
fn test_nested_builders() {
    let a = filled(1u8, &[2, 3]);
    assert_eq!(a.shape(), &[2, 3]);
    let nested = a.clone().to_nested();
    assert_eq!(nested, filled_nested(1u8, &[2, 3]));
    assert_eq!(NdArray::from_nested(nested).unwrap(), a);

    let ragged = Nested::Array(vec![
        Nested::Array(vec![Nested::Scalar(1)]),
        Nested::Array(vec![]),
    ]);
    assert_eq!(NdArray::from_nested(ragged), Err(StridedError::RaggedNested));
}

#[test]
fn test_registry_queries() {
    assert!(classify("complex64")
        .unwrap()
        .contains(&Category::ComplexFloatingPoint));
    assert!(matches!(
        classify("float16"),
        Err(StridedError::UnknownDataType(_))
    ));
    assert_eq!(cast_safety(DataType::Int16, DataType::Float32), CastSafety::Safe);
    assert_eq!(cast_safety(DataType::Float64, DataType::Float32), CastSafety::MostlySafe);
    assert_eq!(cast_safety(DataType::Complex128, DataType::Float64), CastSafety::Unsafe);
    assert_eq!(vec![1u16].dtype(), DataType::Uint16);
}
