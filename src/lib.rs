//! # array-set: array-API set functions across backends
//!
//! `unique_all`, `unique_inverse`, `unique_values` and `unique_counts` over
//! n-dimensional arrays, dispatched to an explicitly injected backend.
//!
//! ## Key Features
//!
//! - **Value-equality semantics**: every NaN is distinct, `+0` and `-0` are one value
//! - **Dtype preserving**: bool, all fixed-width integers, `f32` and `f64`
//! - **Pluggable backends**: sort-based and hash-based backends behind one trait
//! - **No global state**: backends live in a [`BackendRegistry`] owned by the caller
//! - **Nested containers**: apply one call to every array in a [`Container`]
//!
//! ## Quick Start
//!
//! ```rust
//! use array_set::{Array, Dispatcher, Shape};
//!
//! let dispatcher = Dispatcher::default();
//! let x = Array::from_vec(vec![1i32, 2, 2, 1], Shape::new(vec![2, 2])).unwrap();
//! let out = dispatcher.unique_all(&x).unwrap();
//! assert_eq!(out.values.to_vec::<i32>().unwrap(), vec![1, 2]);
//! assert_eq!(out.counts.to_vec::<i64>().unwrap(), vec![2, 2]);
//! assert_eq!(out.inverse_indices.shape().as_slice(), &[2, 2]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod array;
pub mod backend;
mod buffer;
mod config;
pub mod container;
mod dispatch;
mod dtype;
mod error;
pub mod ops;
mod shape;

// Public exports
pub use array::Array;
pub use backend::{BackendKind, BackendRegistry, SetBackend, SortedBackend, StableBackend};
pub use buffer::Element;
pub use config::{Config, BACKEND_ENV, LOG_STATS_ENV};
pub use container::Container;
pub use dispatch::Dispatcher;
pub use dtype::DType;
pub use error::{Error, Result};
pub use ops::set::{value_eq, SetElement, UniqueAll, UniqueCounts, UniqueInverse};
pub use shape::Shape;
pub use num_complex::Complex;
