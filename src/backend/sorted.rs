//! Sort-based set backend.
//!
//! Positions are stably argsorted under [`SetElement::set_cmp`], so
//! value-equal elements become adjacent and each run keeps its members in
//! ascending position order. A run boundary is placed wherever two
//! neighbours are not value-equal, which splits every NaN into its own run.

use super::{BackendKind, SetBackend};
use crate::error::Result;
use crate::ops::set::{self, Grouping, Partition, PartitionBuilder, SetElement};
use crate::Array;

/// Backend returning unique values in ascending order, NaNs last.
///
/// NaNs keep their input order among themselves. The zero class is
/// represented by whichever signed zero occurs first in the input.
///
/// # Examples
///
/// ```
/// use array_set::{Array, SetBackend, SortedBackend};
///
/// let x = Array::vector(vec![4i32, 5, 3, 2, 4, 1, 3]);
/// let out = SortedBackend.unique_inverse(&x).unwrap();
/// assert_eq!(out.values.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 5]);
/// assert_eq!(out.inverse_indices.to_vec::<i64>().unwrap(), vec![3, 4, 2, 1, 3, 0, 2]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SortedBackend;

impl Grouping for SortedBackend {
    fn group<T: SetElement>(data: &[T]) -> Result<Partition> {
        let mut order: Vec<usize> = (0..data.len()).collect();
        // `sort_by` is stable: ties stay in ascending position order.
        order.sort_by(|&a, &b| data[a].set_cmp(&data[b]));

        let mut builder = PartitionBuilder::new(data.len());
        for &pos in &order {
            let class = match builder.last_class() {
                Some(class) if data[builder.first_of(class)].value_eq(&data[pos]) => class,
                _ => builder.open_class(pos),
            };
            builder.assign(pos, class);
        }
        builder.finish()
    }
}

impl SetBackend for SortedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sorted
    }

    fn partition(&self, x: &Array, op: &'static str) -> Result<Partition> {
        set::partition::<SortedBackend>(x, op)
    }
}
