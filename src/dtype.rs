//! Data type definitions and utilities.

use std::fmt;

/// Numerical data type for array contents.
///
/// Real kinds (bool, integers, floats) take part in set operations.
/// Complex kinds can be stored but are rejected by the uniqueness engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean (stored as 1-byte value)
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    Uint8,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit unsigned integer
    Uint32,
    /// 64-bit unsigned integer
    Uint64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Complex number with two 32-bit float components
    Complex64,
    /// Complex number with two 64-bit float components
    Complex128,
}

impl DType {
    /// Every dtype, in declaration order.
    pub const ALL: [DType; 13] = [
        DType::Bool,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Uint8,
        DType::Uint16,
        DType::Uint32,
        DType::Uint64,
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    /// The dtype used for index-valued outputs (`indices`, `inverse_indices`, `counts`).
    pub const INDEX: DType = DType::Int64;

    /// Returns true if this is the boolean dtype.
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, DType::Bool)
    }

    /// Returns true if this is a real floating-point dtype.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Returns true if this is a complex dtype.
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// Returns true if this is an integer dtype.
    #[inline]
    pub const fn is_int(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Returns true if this is a signed integer dtype.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64
        )
    }

    /// Returns true if this is an unsigned integer dtype.
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            DType::Uint8 | DType::Uint16 | DType::Uint32 | DType::Uint64
        )
    }

    /// Returns true if values of this dtype can be partitioned by value-equality.
    ///
    /// Bool, integer and real float kinds qualify; complex kinds do not.
    #[inline]
    pub const fn supports_set_ops(self) -> bool {
        self.is_bool() || self.is_int() || self.is_float()
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
