//! Set-operation backends and their registry.
//!
//! This module contains the backend implementations for:
//! - Sorted: sort-based grouping, values returned in ascending order
//! - Stable: hash-based grouping, values returned in first-occurrence order
//!
//! Backends are never selected through process-wide state. A caller builds
//! a [`BackendRegistry`] and passes it (usually inside a
//! [`crate::Dispatcher`]) to whatever code needs to run set operations.

pub mod sorted;
pub mod stable;

pub use sorted::SortedBackend;
pub use stable::StableBackend;

use crate::error::{Error, Result};
use crate::ops::set::{Partition, UniqueAll, UniqueCounts, UniqueInverse};
use crate::{Array, Config};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies the backend that owns an array.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Sort-based backend (ascending output order)
    #[default]
    Sorted,
    /// Hash-based backend (first-occurrence output order)
    Stable,
}

impl BackendKind {
    /// Returns all backend kinds.
    pub fn all() -> &'static [BackendKind] {
        &[BackendKind::Sorted, BackendKind::Stable]
    }

    /// Returns the name of this backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sorted => "sorted",
            BackendKind::Stable => "stable",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sorted" => Ok(BackendKind::Sorted),
            "stable" => Ok(BackendKind::Stable),
            _ => Err(Error::InvalidConfig {
                key: "backend",
                value: s.to_string(),
            }),
        }
    }
}

/// A numerical backend exposing the array-API set functions.
///
/// Implementors only provide [`SetBackend::partition`]; the four entry
/// points project the partition. Output order is backend-defined, but for
/// one backend it must be deterministic for a given input.
pub trait SetBackend: Send + Sync + fmt::Debug {
    /// The kind this backend is registered under.
    fn kind(&self) -> BackendKind;

    /// Flatten `x` and partition it into value-equality classes.
    ///
    /// `op` names the calling entry point for error messages.
    fn partition(&self, x: &Array, op: &'static str) -> Result<Partition>;

    /// Unique values, first indices, inverse indices and counts.
    fn unique_all(&self, x: &Array) -> Result<UniqueAll> {
        let partition = self.partition(x, "unique_all")?;
        UniqueAll::from_partition(x, &partition)
    }

    /// Unique values and inverse indices.
    fn unique_inverse(&self, x: &Array) -> Result<UniqueInverse> {
        let partition = self.partition(x, "unique_inverse")?;
        UniqueInverse::from_partition(x, &partition)
    }

    /// Unique values and counts.
    fn unique_counts(&self, x: &Array) -> Result<UniqueCounts> {
        let partition = self.partition(x, "unique_counts")?;
        UniqueCounts::from_partition(x, &partition)
    }

    /// Unique values only.
    fn unique_values(&self, x: &Array) -> Result<Array> {
        let partition = self.partition(x, "unique_values")?;
        Ok(partition.values(x))
    }
}

/// Maps backend kinds to backend implementations.
///
/// # Examples
///
/// ```
/// use array_set::{Array, BackendKind, BackendRegistry};
///
/// let registry = BackendRegistry::with_defaults();
/// let x = Array::vector(vec![3i32, 1, 3]);
/// let backend = registry.resolve(&x).unwrap();
/// assert_eq!(backend.kind(), BackendKind::Sorted);
/// ```
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: HashMap<BackendKind, Arc<dyn SetBackend>>,
    default: BackendKind,
}

impl BackendRegistry {
    /// An empty registry that falls back to `default` for unknown arrays.
    pub fn new(default: BackendKind) -> Self {
        Self {
            backends: HashMap::new(),
            default,
        }
    }

    /// A registry holding both built-in backends, defaulting to `sorted`.
    pub fn with_defaults() -> Self {
        Self::with_builtin(BackendKind::default())
    }

    /// A registry holding both built-in backends with the configured default.
    pub fn from_config(config: &Config) -> Self {
        Self::with_builtin(config.default_backend)
    }

    fn with_builtin(default: BackendKind) -> Self {
        let mut registry = Self::new(default);
        registry.register(Arc::new(SortedBackend));
        registry.register(Arc::new(StableBackend));
        registry
    }

    /// Register a backend under its own kind, returning the one it replaces.
    pub fn register(&mut self, backend: Arc<dyn SetBackend>) -> Option<Arc<dyn SetBackend>> {
        self.backends.insert(backend.kind(), backend)
    }

    /// Remove the backend registered under `kind`.
    pub fn unregister(&mut self, kind: BackendKind) -> Option<Arc<dyn SetBackend>> {
        self.backends.remove(&kind)
    }

    /// Look up a backend by kind.
    pub fn get(&self, kind: BackendKind) -> Option<&dyn SetBackend> {
        self.backends.get(&kind).map(|b| b.as_ref())
    }

    /// The kind used for arrays whose own backend is not registered.
    pub fn default_kind(&self) -> BackendKind {
        self.default
    }

    /// Kinds that currently have a backend.
    pub fn kinds(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<BackendKind> = self.backends.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Resolve the backend that should process `x`.
    ///
    /// The array's own backend is preferred. If it is not registered the
    /// default backend is used instead; the caller is expected to convert
    /// the array before handing it over.
    ///
    /// # Errors
    ///
    /// [`Error::BackendUnavailable`] when neither is registered.
    pub fn resolve(&self, x: &Array) -> Result<&dyn SetBackend> {
        if let Some(backend) = self.get(x.backend()) {
            return Ok(backend);
        }
        match self.get(self.default) {
            Some(backend) => {
                log::warn!(
                    "no `{}` backend registered, falling back to `{}`",
                    x.backend(),
                    self.default
                );
                Ok(backend)
            }
            None => Err(Error::BackendUnavailable(x.backend().to_string())),
        }
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
