//! Hash-based set backend.

use super::{BackendKind, SetBackend};
use crate::error::Result;
use crate::ops::set::{self, GroupKey, Grouping, Partition, PartitionBuilder, SetElement};
use crate::Array;
use std::collections::HashMap;

/// Backend returning unique values in first-occurrence order.
///
/// Elements are grouped in one pass through a hash map keyed by
/// [`GroupKey`], giving expected linear time.
///
/// # Examples
///
/// ```
/// use array_set::{Array, SetBackend, StableBackend};
///
/// let x = Array::vector(vec![4i32, 5, 3, 2, 4, 1, 3]);
/// let out = StableBackend.unique_values(&x).unwrap();
/// assert_eq!(out.to_vec::<i32>().unwrap(), vec![4, 5, 3, 2, 1]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct StableBackend;

impl Grouping for StableBackend {
    fn group<T: SetElement>(data: &[T]) -> Result<Partition> {
        let mut builder = PartitionBuilder::new(data.len());
        let mut slots: HashMap<GroupKey, usize> = HashMap::with_capacity(data.len());

        for (pos, value) in data.iter().enumerate() {
            let class = *slots
                .entry(value.group_key(pos))
                .or_insert_with(|| builder.open_class(pos));
            builder.assign(pos, class);
        }
        builder.finish()
    }
}

impl SetBackend for StableBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Stable
    }

    fn partition(&self, x: &Array, op: &'static str) -> Result<Partition> {
        set::partition::<StableBackend>(x, op)
    }
}
