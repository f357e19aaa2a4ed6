//! Error type shared by arrays, backends and the dispatcher.

use crate::{DType, Shape};
use thiserror::Error;

/// Errors raised by array construction and set operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The element kind cannot be partitioned by value-equality.
    #[error("unsupported dtype {dtype} for {op}: expected bool, integer or real float")]
    UnsupportedDtype {
        /// Entry point that rejected the array.
        op: &'static str,
        /// The rejected dtype.
        dtype: DType,
    },

    /// A caller-supplied output array has the wrong shape.
    #[error("output shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// Shape of the computed result.
        expected: Shape,
        /// Shape of the supplied array.
        found: Shape,
    },

    /// A caller-supplied array has the wrong dtype.
    #[error("dtype mismatch: expected {expected}, found {found}")]
    DtypeMismatch {
        /// Dtype the operation requires.
        expected: DType,
        /// Dtype that was supplied.
        found: DType,
    },

    /// Flat data does not fill the requested shape.
    #[error("data length {len} does not match shape {shape}")]
    DataLength {
        /// Number of elements supplied.
        len: usize,
        /// Requested shape.
        shape: Shape,
    },

    /// Reshape target has a different element count.
    #[error("cannot reshape array of shape {from} into shape {to}")]
    InvalidReshape {
        /// Current shape.
        from: Shape,
        /// Requested shape.
        to: Shape,
    },

    /// A grouping strategy left a flat position without a class.
    #[error("partition of {len} elements leaves position {position} unassigned")]
    UnassignedPosition {
        /// First position with no class.
        position: usize,
        /// Number of flattened elements.
        len: usize,
    },

    /// No backend is registered for the array, and no default can take it.
    #[error("no set backend available for `{0}`")]
    BackendUnavailable(String),

    /// A configuration value could not be interpreted.
    #[error("invalid configuration value `{value}` for {key}")]
    InvalidConfig {
        /// Setting name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A configuration document could not be read or parsed.
    #[error("cannot load configuration from {origin}: {message}")]
    ConfigParse {
        /// File path, or `<string>` for in-memory documents.
        origin: String,
        /// Underlying reader or parser message.
        message: String,
    },

    /// An error raised while processing one leaf of a container.
    #[error("at `{path}`: {source}")]
    AtKey {
        /// `/`-separated path of the failing leaf.
        path: String,
        /// Error raised for that leaf.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with the container path it was raised under.
    ///
    /// Nested wrapping joins the paths, so the outermost error names the
    /// full route to the failing leaf.
    pub fn at_key(self, key: &str) -> Error {
        match self {
            Error::AtKey { path, source } => Error::AtKey {
                path: format!("{}/{}", key, path),
                source,
            },
            other => Error::AtKey {
                path: key.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, with any container path annotations removed.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::AtKey { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::UnsupportedDtype {
            op: "unique_all",
            dtype: DType::Complex64,
        };
        assert_eq!(
            err.to_string(),
            "unsupported dtype complex64 for unique_all: expected bool, integer or real float"
        );

        let err = Error::ShapeMismatch {
            expected: Shape::vector(3),
            found: Shape::new(vec![2, 2]),
        };
        assert_eq!(err.to_string(), "output shape mismatch: expected (3,), found (2, 2)");
    }

    #[test]
    fn test_at_key_nests_paths() {
        let err = Error::DtypeMismatch {
            expected: DType::Int64,
            found: DType::Float32,
        }
        .at_key("b")
        .at_key("a");

        match &err {
            Error::AtKey { path, .. } => assert_eq!(path, "a/b"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root_cause(), Error::DtypeMismatch { .. }));
        assert!(err.to_string().starts_with("at `a/b`: dtype mismatch"));
    }
}
