//! Call boundary between callers and set backends.
//!
//! The [`Dispatcher`] owns a [`BackendRegistry`] and, for each call:
//!
//! 1. resolves the backend for the input array,
//! 2. converts the input into that backend's representation when the
//!    array belongs to a backend that is not registered,
//! 3. runs the operation, and
//! 4. tags the outputs back with the input's backend.
//!
//! Containers of arrays are handled by applying the same call to every
//! leaf, see [`Dispatcher::map_nested`].

use crate::backend::{BackendRegistry, SetBackend};
use crate::container::Container;
use crate::error::Result;
use crate::ops::set::{self, UniqueAll, UniqueCounts, UniqueInverse};
use crate::{Array, BackendKind, Config};
use std::borrow::Cow;

/// Entry point for the four array-API set functions.
///
/// # Examples
///
/// ```
/// use array_set::{Array, Dispatcher};
///
/// let dispatcher = Dispatcher::default();
/// let x = Array::vector(vec![1i32, 2, 1, 3, 4, 1, 3]);
/// let out = dispatcher.unique_counts(&x).unwrap();
/// assert_eq!(out.values.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4]);
/// assert_eq!(out.counts.to_vec::<i64>().unwrap(), vec![3, 1, 2, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: BackendRegistry,
    log_partition_stats: bool,
}

impl Dispatcher {
    /// Dispatch through `registry`.
    pub fn new(registry: BackendRegistry) -> Self {
        Self {
            registry,
            log_partition_stats: false,
        }
    }

    /// Dispatcher over the built-in backends, set up from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            registry: BackendRegistry::from_config(config),
            log_partition_stats: config.log_partition_stats,
        }
    }

    /// The registry used to resolve backends.
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Mutable access to the registry, e.g. to register a custom backend.
    pub fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }

    /// Resolve the backend for `x` and convert `x` for it if needed.
    fn enter<'a>(&self, x: &'a Array, op: &str) -> Result<(&dyn SetBackend, Cow<'a, Array>)> {
        let backend = self.registry.resolve(x)?;
        let input = if backend.kind() == x.backend() {
            Cow::Borrowed(x)
        } else {
            Cow::Owned(x.to_backend(backend.kind()))
        };
        log::debug!(
            "{}: {} on `{}` backend (from `{}`)",
            op,
            x,
            backend.kind(),
            x.backend()
        );
        Ok((backend, input))
    }

    fn stats(&self, op: &str, classes: usize, size: usize) {
        if self.log_partition_stats {
            log::debug!("{}: {} unique of {} elements", op, classes, size);
        }
    }

    /// Unique values, first indices, inverse indices and counts of `x`.
    pub fn unique_all(&self, x: &Array) -> Result<UniqueAll> {
        let (backend, input) = self.enter(x, "unique_all")?;
        let out = backend.unique_all(&input)?;
        self.stats("unique_all", out.values.size(), x.size());
        Ok(UniqueAll {
            values: exit(out.values, x.backend()),
            indices: exit(out.indices, x.backend()),
            inverse_indices: exit(out.inverse_indices, x.backend()),
            counts: exit(out.counts, x.backend()),
        })
    }

    /// Unique values and inverse indices of `x`.
    pub fn unique_inverse(&self, x: &Array) -> Result<UniqueInverse> {
        let (backend, input) = self.enter(x, "unique_inverse")?;
        let out = backend.unique_inverse(&input)?;
        self.stats("unique_inverse", out.values.size(), x.size());
        Ok(UniqueInverse {
            values: exit(out.values, x.backend()),
            inverse_indices: exit(out.inverse_indices, x.backend()),
        })
    }

    /// Unique values and counts of `x`.
    pub fn unique_counts(&self, x: &Array) -> Result<UniqueCounts> {
        let (backend, input) = self.enter(x, "unique_counts")?;
        let out = backend.unique_counts(&input)?;
        self.stats("unique_counts", out.values.size(), x.size());
        Ok(UniqueCounts {
            values: exit(out.values, x.backend()),
            counts: exit(out.counts, x.backend()),
        })
    }

    /// Unique values of `x`, optionally written into `out`.
    ///
    /// When `out` is given it must already have the shape and dtype of the
    /// result; it is overwritten and the same values are returned.
    ///
    /// # Errors
    ///
    /// Besides backend errors, [`crate::Error::ShapeMismatch`] or
    /// [`crate::Error::DtypeMismatch`] when `out` does not fit.
    pub fn unique_values(&self, x: &Array, out: Option<&mut Array>) -> Result<Array> {
        let (backend, input) = self.enter(x, "unique_values")?;
        let values = exit(backend.unique_values(&input)?, x.backend());
        self.stats("unique_values", values.size(), x.size());
        if let Some(out) = out {
            set::write_out(&values, out)?;
        }
        Ok(values)
    }

    /// Apply `op` to every array in `container`, keeping its keys.
    ///
    /// Fails on the first leaf whose call fails; the error carries the
    /// leaf's path.
    ///
    /// # Examples
    ///
    /// ```
    /// use array_set::{Array, Container, Dispatcher};
    ///
    /// let d = Dispatcher::default();
    /// let c = Container::node([
    ///     ("a", Container::leaf(Array::vector(vec![0.0f32, 1.0, 1.0]))),
    ///     ("b", Container::leaf(Array::vector(vec![1i32, 2, 1, 3]))),
    /// ]);
    /// let out = d.map_nested(&c, |d, x| d.unique_counts(x)).unwrap();
    /// assert_eq!(out.get("b").unwrap().values.size(), 3);
    /// ```
    pub fn map_nested<T, F>(&self, container: &Container<Array>, op: F) -> Result<Container<T>>
    where
        F: Fn(&Self, &Array) -> Result<T>,
    {
        container.try_map(|x| op(self, x))
    }

    /// [`Dispatcher::unique_all`] over every array in `container`.
    pub fn unique_all_nested(&self, container: &Container<Array>) -> Result<Container<UniqueAll>> {
        self.map_nested(container, Self::unique_all)
    }

    /// [`Dispatcher::unique_values`] over every array in `container`.
    pub fn unique_values_nested(&self, container: &Container<Array>) -> Result<Container<Array>> {
        self.map_nested(container, |d, x| d.unique_values(x, None))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(BackendRegistry::with_defaults())
    }
}

fn exit(array: Array, origin: BackendKind) -> Array {
    array.with_backend(origin)
}
