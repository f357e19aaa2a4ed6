//! Shared helpers for the integration tests.

#![allow(dead_code)]

use array_set::{value_eq, Array, SetElement, Shape, UniqueAll};
use proptest::prelude::*;

/// Install `env_logger` once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// GENERATORS
// =============================================================================

/// Shapes with 0-3 dimensions, each 0-4 long (zero-length axes included).
pub fn arb_shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(0usize..=4, 0..=3).prop_map(Shape::new)
}

/// f64 drawn from a small pool so duplicates are common, plus IEEE specials.
pub fn arb_f64_element() -> impl Strategy<Value = f64> + Clone {
    prop_oneof![
        6 => (-3i32..=3).prop_map(f64::from),
        1 => Just(f64::NAN),
        1 => Just(0.0),
        1 => Just(-0.0),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
        1 => any::<f64>(),
    ]
}

/// f32 counterpart of [`arb_f64_element`].
pub fn arb_f32_element() -> impl Strategy<Value = f32> + Clone {
    prop_oneof![
        6 => (-3i16..=3).prop_map(f32::from),
        1 => Just(f32::NAN),
        1 => Just(0.0),
        1 => Just(-0.0),
        1 => Just(f32::INFINITY),
        1 => any::<f32>(),
    ]
}

/// An array of `shape` filled from `element`.
pub fn arb_array_of<T, S>(element: S) -> impl Strategy<Value = Array>
where
    T: SetElement,
    S: Strategy<Value = T> + Clone,
{
    arb_shape().prop_flat_map(move |shape| {
        let size = shape.size();
        prop::collection::vec(element.clone(), size).prop_map(move |data| {
            Array::from_vec(data, shape.clone()).expect("generated data fits its shape")
        })
    })
}

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Same element, including NaN against NaN.
pub fn same_element<T: SetElement>(a: T, b: T) -> bool {
    value_eq(a, b) || (a.is_nan() && b.is_nan())
}

/// Check every order-independent property of a `unique_all` result.
pub fn check_unique_all<T: SetElement>(x: &Array, out: &UniqueAll) -> Result<(), TestCaseError> {
    let data = x.to_vec::<T>().expect("input dtype");
    let values = out.values.to_vec::<T>().expect("values keep dtype");
    let indices = out.indices.to_vec::<i64>().expect("int64 indices");
    let inverse = out.inverse_indices.to_vec::<i64>().expect("int64 inverse");
    let counts = out.counts.to_vec::<i64>().expect("int64 counts");

    prop_assert_eq!(values.len(), indices.len());
    prop_assert_eq!(values.len(), counts.len());
    prop_assert_eq!(out.values.ndim(), 1);
    prop_assert_eq!(out.inverse_indices.shape(), x.shape());
    prop_assert_eq!(inverse.len(), data.len());
    prop_assert_eq!(counts.iter().sum::<i64>() as usize, data.len());

    // Reconstruction (signed zeros compare equal under value_eq).
    let mut seen = vec![0i64; values.len()];
    let mut first = vec![usize::MAX; values.len()];
    for (p, (&v, &k)) in data.iter().zip(inverse.iter()).enumerate() {
        let k = k as usize;
        prop_assert!(k < values.len(), "inverse index {} out of range", k);
        prop_assert!(same_element(values[k], v), "position {} reconstructs wrongly", p);
        seen[k] += 1;
        first[k] = first[k].min(p);
    }
    prop_assert_eq!(&seen, &counts);

    for k in 0..values.len() {
        prop_assert_eq!(indices[k] as usize, first[k]);
        prop_assert!(same_element(values[k], data[first[k]]));
    }

    // Classes are pairwise distinct.
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            prop_assert!(!value_eq(values[i], values[j]), "classes {} and {} are equal", i, j);
        }
    }

    // One singleton class per NaN.
    let nan_inputs = data.iter().filter(|v| v.is_nan()).count();
    let nan_classes: Vec<usize> = (0..values.len()).filter(|&k| values[k].is_nan()).collect();
    prop_assert_eq!(nan_classes.len(), nan_inputs);
    for k in nan_classes {
        prop_assert_eq!(counts[k], 1);
    }

    Ok(())
}

/// `(first index, count)` of every class, sorted by first index.
///
/// Every class has a distinct first index, so this is an order-free
/// fingerprint of a partition.
pub fn class_fingerprint(out: &UniqueAll) -> Vec<(i64, i64)> {
    let indices = out.indices.to_vec::<i64>().expect("int64 indices");
    let counts = out.counts.to_vec::<i64>().expect("int64 counts");
    let mut classes: Vec<(i64, i64)> = indices.into_iter().zip(counts).collect();
    classes.sort_unstable();
    classes
}
