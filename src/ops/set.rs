//! Value-based uniqueness engine.
//!
//! Elements are partitioned into equivalence classes under value-equality:
//! integers and booleans compare by value, floats compare with IEEE `==`,
//! so every NaN is its own class and `+0`/`-0` share one class.
//!
//! The grouping strategy is pluggable through [`Grouping`]; the backends in
//! [`crate::backend`] provide a sort-based and a hash-based strategy. Both
//! feed a [`PartitionBuilder`], and the resulting [`Partition`] is projected
//! into the four array-API result shapes ([`UniqueAll`], [`UniqueInverse`],
//! [`UniqueCounts`] and the plain `values` array).

use crate::buffer::Element;
use crate::error::{Error, Result};
use crate::{Array, DType, Shape};
use std::cmp::Ordering;

/// Hash key under which value-equal elements collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Canonical bit pattern of a non-NaN value. Both zeros map to `Bits(0)`.
    Bits(u64),
    /// A NaN, keyed by its flat position so that no two NaNs collide.
    Nan(usize),
}

/// Element types the uniqueness engine can partition.
///
/// Implemented for `bool`, all fixed-width integers, `f32` and `f64`.
pub trait SetElement: Element {
    /// Value-equality: NaN equals nothing, signed zeros are equal.
    fn value_eq(&self, other: &Self) -> bool;

    /// Grouping key for an element found at flat `position`.
    fn group_key(&self, position: usize) -> GroupKey;

    /// Total order consistent with [`SetElement::value_eq`] on non-NaN
    /// values. NaN sorts after every other value.
    fn set_cmp(&self, other: &Self) -> Ordering;

    /// Returns true for floating-point NaN.
    fn is_nan(&self) -> bool {
        false
    }
}

impl SetElement for bool {
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn group_key(&self, _position: usize) -> GroupKey {
        GroupKey::Bits(*self as u64)
    }

    fn set_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

macro_rules! impl_set_element_int {
    ($($ty:ty),*) => {
        $(
            impl SetElement for $ty {
                #[inline]
                fn value_eq(&self, other: &Self) -> bool {
                    self == other
                }

                #[inline]
                fn group_key(&self, _position: usize) -> GroupKey {
                    GroupKey::Bits(*self as u64)
                }

                #[inline]
                fn set_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

impl_set_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_set_element_float {
    ($($ty:ty),*) => {
        $(
            impl SetElement for $ty {
                #[inline]
                fn value_eq(&self, other: &Self) -> bool {
                    // IEEE `==`: NaN is unequal to itself, -0 == +0.
                    self == other
                }

                #[inline]
                fn group_key(&self, position: usize) -> GroupKey {
                    if self.is_nan() {
                        GroupKey::Nan(position)
                    } else if *self == 0.0 {
                        GroupKey::Bits(0)
                    } else {
                        GroupKey::Bits(self.to_bits() as u64)
                    }
                }

                #[inline]
                fn set_cmp(&self, other: &Self) -> Ordering {
                    match (<$ty>::is_nan(*self), <$ty>::is_nan(*other)) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }

                #[inline]
                fn is_nan(&self) -> bool {
                    <$ty>::is_nan(*self)
                }
            }
        )*
    };
}

impl_set_element_float!(f32, f64);

/// Value-equality predicate shared by partitioning and reconstruction checks.
///
/// # Examples
///
/// ```
/// use array_set::value_eq;
/// assert!(value_eq(-0.0f64, 0.0));
/// assert!(!value_eq(f32::NAN, f32::NAN));
/// assert!(value_eq(3u8, 3));
/// ```
pub fn value_eq<T: SetElement>(a: T, b: T) -> bool {
    a.value_eq(&b)
}

/// A set of flat positions judged value-equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquivalenceClass {
    first: usize,
    count: usize,
}

impl EquivalenceClass {
    /// Smallest flat position in the class. Its element is the representative.
    #[inline]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Number of positions in the class.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Incremental construction of a [`Partition`].
///
/// Grouping strategies open classes in their chosen output order and
/// assign every flat position to exactly one class.
#[derive(Debug)]
pub struct PartitionBuilder {
    classes: Vec<EquivalenceClass>,
    inverse: Vec<usize>,
}

impl PartitionBuilder {
    /// Builder for an input of `len` flattened elements.
    pub fn new(len: usize) -> Self {
        Self {
            classes: Vec::new(),
            inverse: vec![usize::MAX; len],
        }
    }

    /// Open a new class whose first occurrence is `first`; returns its index.
    pub fn open_class(&mut self, first: usize) -> usize {
        self.classes.push(EquivalenceClass { first, count: 0 });
        self.classes.len() - 1
    }

    /// Index of the most recently opened class.
    pub fn last_class(&self) -> Option<usize> {
        self.classes.len().checked_sub(1)
    }

    /// First position of class `class`.
    pub fn first_of(&self, class: usize) -> usize {
        self.classes[class].first
    }

    /// Record that flat `position` belongs to `class`.
    pub fn assign(&mut self, position: usize, class: usize) {
        debug_assert_eq!(self.inverse[position], usize::MAX, "position assigned twice");
        let entry = &mut self.classes[class];
        entry.count += 1;
        entry.first = entry.first.min(position);
        self.inverse[position] = class;
    }

    /// Finish the partition.
    ///
    /// # Errors
    ///
    /// [`Error::UnassignedPosition`] if a grouping left a position without
    /// a class.
    pub fn finish(self) -> Result<Partition> {
        if let Some(position) = self.inverse.iter().position(|&c| c >= self.classes.len()) {
            return Err(Error::UnassignedPosition {
                position,
                len: self.inverse.len(),
            });
        }
        Ok(Partition {
            classes: self.classes,
            inverse: self.inverse,
        })
    }
}

/// Equivalence classes of a flattened array, in backend-defined order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    classes: Vec<EquivalenceClass>,
    inverse: Vec<usize>,
}

impl Partition {
    /// Number of classes (unique values).
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true when the input was empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The classes in output order.
    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// Class index of every flat input position.
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// First-occurrence position of every class.
    pub fn first_indices(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.first).collect()
    }

    /// Member count of every class.
    pub fn counts(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.count).collect()
    }

    /// Representative values (element at each class's first occurrence).
    pub fn values(&self, x: &Array) -> Array {
        x.take_flat(&self.first_indices())
    }

    fn index_array(data: Vec<usize>, shape: Shape, x: &Array) -> Result<Array> {
        let data: Vec<i64> = data.into_iter().map(|i| i as i64).collect();
        Ok(Array::from_vec(data, shape)?.with_backend(x.backend()))
    }

    /// First-occurrence indices as a one-dimensional index array.
    pub fn indices_array(&self, x: &Array) -> Result<Array> {
        Self::index_array(self.first_indices(), Shape::vector(self.len()), x)
    }

    /// Counts as a one-dimensional index array.
    pub fn counts_array(&self, x: &Array) -> Result<Array> {
        Self::index_array(self.counts(), Shape::vector(self.len()), x)
    }

    /// Inverse indices shaped like the input array.
    pub fn inverse_array(&self, x: &Array) -> Result<Array> {
        Self::index_array(self.inverse.clone(), x.shape().clone(), x)
    }
}

/// A strategy for grouping a flat slice into equivalence classes.
pub trait Grouping {
    /// Partition `data` by value-equality.
    ///
    /// Implementations build the result with a [`PartitionBuilder`], whose
    /// `finish` rejects partitions that leave a position unassigned.
    fn group<T: SetElement>(data: &[T]) -> Result<Partition>;
}

/// Flatten `x` and partition it with strategy `G`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDtype`] for complex arrays, before any
/// element is read.
pub fn partition<G: Grouping>(x: &Array, op: &'static str) -> Result<Partition> {
    let dtype = x.dtype();
    if !dtype.supports_set_ops() {
        return Err(Error::UnsupportedDtype { op, dtype });
    }
    let partition = match dtype {
        DType::Bool => G::group(&x.to_vec::<bool>()?)?,
        DType::Int8 => G::group(&x.to_vec::<i8>()?)?,
        DType::Int16 => G::group(&x.to_vec::<i16>()?)?,
        DType::Int32 => G::group(&x.to_vec::<i32>()?)?,
        DType::Int64 => G::group(&x.to_vec::<i64>()?)?,
        DType::Uint8 => G::group(&x.to_vec::<u8>()?)?,
        DType::Uint16 => G::group(&x.to_vec::<u16>()?)?,
        DType::Uint32 => G::group(&x.to_vec::<u32>()?)?,
        DType::Uint64 => G::group(&x.to_vec::<u64>()?)?,
        DType::Float32 => G::group(&x.to_vec::<f32>()?)?,
        DType::Float64 => G::group(&x.to_vec::<f64>()?)?,
        DType::Complex64 | DType::Complex128 => unreachable!("rejected by supports_set_ops"),
    };
    log::trace!(
        "{}: {} elements of {} -> {} classes",
        op,
        x.size(),
        x.dtype(),
        partition.len()
    );
    Ok(partition)
}

/// Output of `unique_all`.
#[derive(Debug, Clone)]
pub struct UniqueAll {
    /// Unique values, same dtype as the input, one-dimensional.
    pub values: Array,
    /// First-occurrence flat index of each value (`int64`).
    pub indices: Array,
    /// Index into `values` for every input element, shaped like the input (`int64`).
    pub inverse_indices: Array,
    /// Occurrence count of each value (`int64`).
    pub counts: Array,
}

impl UniqueAll {
    /// Project a partition of `x`.
    pub fn from_partition(x: &Array, partition: &Partition) -> Result<Self> {
        Ok(Self {
            values: partition.values(x),
            indices: partition.indices_array(x)?,
            inverse_indices: partition.inverse_array(x)?,
            counts: partition.counts_array(x)?,
        })
    }
}

/// Output of `unique_inverse`.
#[derive(Debug, Clone)]
pub struct UniqueInverse {
    /// Unique values, same dtype as the input, one-dimensional.
    pub values: Array,
    /// Index into `values` for every input element, shaped like the input (`int64`).
    pub inverse_indices: Array,
}

impl UniqueInverse {
    /// Project a partition of `x`.
    pub fn from_partition(x: &Array, partition: &Partition) -> Result<Self> {
        Ok(Self {
            values: partition.values(x),
            inverse_indices: partition.inverse_array(x)?,
        })
    }
}

/// Output of `unique_counts`.
#[derive(Debug, Clone)]
pub struct UniqueCounts {
    /// Unique values, same dtype as the input, one-dimensional.
    pub values: Array,
    /// Occurrence count of each value (`int64`).
    pub counts: Array,
}

impl UniqueCounts {
    /// Project a partition of `x`.
    pub fn from_partition(x: &Array, partition: &Partition) -> Result<Self> {
        Ok(Self {
            values: partition.values(x),
            counts: partition.counts_array(x)?,
        })
    }
}

/// Write `values` into a caller-provided output array.
///
/// The output must already have the shape and dtype of `values`.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] or [`Error::DtypeMismatch`]; `out` is left
/// untouched on error.
pub fn write_out(values: &Array, out: &mut Array) -> Result<()> {
    if out.shape() != values.shape() {
        return Err(Error::ShapeMismatch {
            expected: values.shape().clone(),
            found: out.shape().clone(),
        });
    }
    if out.dtype() != values.dtype() {
        return Err(Error::DtypeMismatch {
            expected: values.dtype(),
            found: out.dtype(),
        });
    }
    *out = values.to_backend(out.backend());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keeps first-occurrence order; enough to exercise the projections.
    struct FirstSeen;

    impl Grouping for FirstSeen {
        fn group<T: SetElement>(data: &[T]) -> Result<Partition> {
            let mut builder = PartitionBuilder::new(data.len());
            let mut seen: Vec<(T, usize)> = Vec::new();
            for (pos, value) in data.iter().enumerate() {
                let class = match seen.iter().find(|(v, _)| v.value_eq(value)) {
                    Some(&(_, class)) => class,
                    None => {
                        let class = builder.open_class(pos);
                        seen.push((*value, class));
                        class
                    }
                };
                builder.assign(pos, class);
            }
            builder.finish()
        }
    }

    #[test]
    fn test_value_eq_floats() {
        assert!(value_eq(0.0f32, -0.0));
        assert!(value_eq(f64::INFINITY, f64::INFINITY));
        assert!(!value_eq(f64::INFINITY, f64::NEG_INFINITY));
        assert!(!value_eq(f64::NAN, f64::NAN));
        assert!(!value_eq(f32::NAN, 1.0));
        assert!(value_eq(1.5f32, 1.5));
    }

    #[test]
    fn test_value_eq_ints_and_bool() {
        assert!(value_eq(-3i64, -3));
        assert!(!value_eq(255u8, 254));
        assert!(value_eq(true, true));
        assert!(!value_eq(true, false));
    }

    #[test]
    fn test_group_key_canonicalizes_zero() {
        assert_eq!((-0.0f64).group_key(0), 0.0f64.group_key(7));
        assert_eq!((-0.0f32).group_key(3), GroupKey::Bits(0));
        assert_ne!(1.0f64.group_key(0), (-1.0f64).group_key(0));
    }

    #[test]
    fn test_group_key_separates_nans() {
        let nan = f32::NAN;
        assert_eq!(nan.group_key(2), GroupKey::Nan(2));
        assert_ne!(nan.group_key(2), nan.group_key(3));
    }

    #[test]
    fn test_set_cmp_puts_nan_last() {
        assert_eq!(f64::NAN.set_cmp(&f64::INFINITY), Ordering::Greater);
        assert_eq!(1.0f64.set_cmp(&f64::NAN), Ordering::Less);
        assert_eq!((-0.0f32).set_cmp(&0.0), Ordering::Equal);
        assert_eq!((-5i16).set_cmp(&3), Ordering::Less);
    }

    #[test]
    fn test_builder_tracks_first_and_count() {
        let mut builder = PartitionBuilder::new(4);
        let a = builder.open_class(2);
        let b = builder.open_class(1);
        builder.assign(2, a);
        builder.assign(0, a);
        builder.assign(1, b);
        builder.assign(3, a);
        let p = builder.finish().unwrap();
        assert_eq!(p.first_indices(), vec![0, 1]);
        assert_eq!(p.counts(), vec![3, 1]);
        assert_eq!(p.inverse(), &[0, 1, 0, 0]);
    }

    #[test]
    fn test_finish_rejects_unassigned_position() {
        let mut builder = PartitionBuilder::new(3);
        let a = builder.open_class(0);
        builder.assign(0, a);
        builder.assign(2, a);
        assert_eq!(
            builder.finish().unwrap_err(),
            Error::UnassignedPosition { position: 1, len: 3 }
        );
    }

    #[test]
    fn test_incomplete_grouping_is_an_error() {
        /// Drops the last position.
        struct SkipsLast;

        impl Grouping for SkipsLast {
            fn group<T: SetElement>(data: &[T]) -> Result<Partition> {
                let mut builder = PartitionBuilder::new(data.len());
                for pos in 0..data.len().saturating_sub(1) {
                    let class = builder.open_class(pos);
                    builder.assign(pos, class);
                }
                builder.finish()
            }
        }

        let x = Array::vector(vec![1.0f32, 2.0, 3.0]);
        let err = partition::<SkipsLast>(&x, "unique_all").unwrap_err();
        assert_eq!(err, Error::UnassignedPosition { position: 2, len: 3 });
        assert!(partition::<SkipsLast>(&Array::vector(Vec::<u8>::new()), "unique_all").is_ok());
    }

    #[test]
    fn test_partition_projections() {
        let x = Array::from_vec(vec![3i32, 1, 3, 2], Shape::new(vec![2, 2])).unwrap();
        let p = partition::<FirstSeen>(&x, "unique_all").unwrap();
        let all = UniqueAll::from_partition(&x, &p).unwrap();
        assert_eq!(all.values.to_vec::<i32>().unwrap(), vec![3, 1, 2]);
        assert_eq!(all.values.dtype(), DType::Int32);
        assert_eq!(all.indices.to_vec::<i64>().unwrap(), vec![0, 1, 3]);
        assert_eq!(all.counts.to_vec::<i64>().unwrap(), vec![2, 1, 1]);
        assert_eq!(all.inverse_indices.shape().as_slice(), &[2, 2]);
        assert_eq!(all.inverse_indices.to_vec::<i64>().unwrap(), vec![0, 1, 0, 2]);
        assert_eq!(all.inverse_indices.dtype(), DType::INDEX);
    }

    #[test]
    fn test_partition_rejects_complex() {
        let x = Array::zeros(Shape::vector(3), DType::Complex64);
        let err = partition::<FirstSeen>(&x, "unique_values").unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedDtype {
                op: "unique_values",
                dtype: DType::Complex64
            }
        );
    }

    #[test]
    fn test_zero_class_uses_first_sign() {
        let x = Array::vector(vec![-0.0f64, 1.0, 0.0]);
        let p = partition::<FirstSeen>(&x, "unique_values").unwrap();
        let values = p.values(&x).to_vec::<f64>().unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[0] == 0.0 && values[0].is_sign_negative());
        assert_eq!(p.counts(), vec![2, 1]);
    }

    #[test]
    fn test_write_out_checks_shape_and_dtype() {
        let values = Array::vector(vec![1u32, 2, 3]);

        let mut wrong_shape = Array::zeros(Shape::vector(2), DType::Uint32);
        assert!(matches!(
            write_out(&values, &mut wrong_shape),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(wrong_shape.size(), 2);

        let mut wrong_dtype = Array::zeros(Shape::vector(3), DType::Int64);
        assert!(matches!(
            write_out(&values, &mut wrong_dtype),
            Err(Error::DtypeMismatch { .. })
        ));

        let mut out = Array::zeros(Shape::vector(3), DType::Uint32);
        write_out(&values, &mut out).unwrap();
        assert_eq!(out.to_vec::<u32>().unwrap(), vec![1, 2, 3]);
    }
}
