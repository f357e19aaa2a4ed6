//! Buffer abstraction for array data storage.

use crate::DType;
use num_complex::Complex;
use std::sync::Arc;

/// Raw data buffer for array storage.
///
/// Buffers are reference-counted and can be shared between arrays
/// for zero-copy views. Elements are stored in their native Rust type,
/// so no value is ever widened or narrowed on its way in or out.
#[derive(Debug, Clone)]
pub struct Buffer {
    inner: Arc<BufferInner>,
}

#[derive(Debug)]
enum BufferInner {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex<f32>>),
    Complex128(Vec<Complex<f64>>),
}

/// Applies `$body` to the typed vector inside a `BufferInner`. With `wrap`,
/// the result is rebuilt into the same variant.
macro_rules! for_each_variant {
    ($inner:expr, $data:ident => wrap $body:expr) => {
        match $inner {
            BufferInner::Bool($data) => BufferInner::Bool($body),
            BufferInner::Int8($data) => BufferInner::Int8($body),
            BufferInner::Int16($data) => BufferInner::Int16($body),
            BufferInner::Int32($data) => BufferInner::Int32($body),
            BufferInner::Int64($data) => BufferInner::Int64($body),
            BufferInner::Uint8($data) => BufferInner::Uint8($body),
            BufferInner::Uint16($data) => BufferInner::Uint16($body),
            BufferInner::Uint32($data) => BufferInner::Uint32($body),
            BufferInner::Uint64($data) => BufferInner::Uint64($body),
            BufferInner::Float32($data) => BufferInner::Float32($body),
            BufferInner::Float64($data) => BufferInner::Float64($body),
            BufferInner::Complex64($data) => BufferInner::Complex64($body),
            BufferInner::Complex128($data) => BufferInner::Complex128($body),
        }
    };
    ($inner:expr, $data:ident => $body:expr) => {
        match $inner {
            BufferInner::Bool($data) => $body,
            BufferInner::Int8($data) => $body,
            BufferInner::Int16($data) => $body,
            BufferInner::Int32($data) => $body,
            BufferInner::Int64($data) => $body,
            BufferInner::Uint8($data) => $body,
            BufferInner::Uint16($data) => $body,
            BufferInner::Uint32($data) => $body,
            BufferInner::Uint64($data) => $body,
            BufferInner::Float32($data) => $body,
            BufferInner::Float64($data) => $body,
            BufferInner::Complex64($data) => $body,
            BufferInner::Complex128($data) => $body,
        }
    };
}

impl Buffer {
    fn wrap(inner: BufferInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create a new buffer from typed data.
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }

    /// Create a new buffer filled with zeros (`false` for bool).
    pub fn zeros(len: usize, dtype: DType) -> Self {
        let inner = match dtype {
            DType::Bool => BufferInner::Bool(vec![false; len]),
            DType::Int8 => BufferInner::Int8(vec![0; len]),
            DType::Int16 => BufferInner::Int16(vec![0; len]),
            DType::Int32 => BufferInner::Int32(vec![0; len]),
            DType::Int64 => BufferInner::Int64(vec![0; len]),
            DType::Uint8 => BufferInner::Uint8(vec![0; len]),
            DType::Uint16 => BufferInner::Uint16(vec![0; len]),
            DType::Uint32 => BufferInner::Uint32(vec![0; len]),
            DType::Uint64 => BufferInner::Uint64(vec![0; len]),
            DType::Float32 => BufferInner::Float32(vec![0.0; len]),
            DType::Float64 => BufferInner::Float64(vec![0.0; len]),
            DType::Complex64 => BufferInner::Complex64(vec![Complex::new(0.0, 0.0); len]),
            DType::Complex128 => BufferInner::Complex128(vec![Complex::new(0.0, 0.0); len]),
        };
        Self::wrap(inner)
    }

    /// Get the data type of this buffer.
    pub fn dtype(&self) -> DType {
        match &*self.inner {
            BufferInner::Bool(_) => DType::Bool,
            BufferInner::Int8(_) => DType::Int8,
            BufferInner::Int16(_) => DType::Int16,
            BufferInner::Int32(_) => DType::Int32,
            BufferInner::Int64(_) => DType::Int64,
            BufferInner::Uint8(_) => DType::Uint8,
            BufferInner::Uint16(_) => DType::Uint16,
            BufferInner::Uint32(_) => DType::Uint32,
            BufferInner::Uint64(_) => DType::Uint64,
            BufferInner::Float32(_) => DType::Float32,
            BufferInner::Float64(_) => DType::Float64,
            BufferInner::Complex64(_) => DType::Complex64,
            BufferInner::Complex128(_) => DType::Complex128,
        }
    }

    /// Get the number of elements in this buffer.
    pub fn len(&self) -> usize {
        for_each_variant!(&*self.inner, data => data.len())
    }

    /// Returns true if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the elements as `&[T]`, or `None` if `T` is not this buffer's type.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Copy the elements at the given physical positions into a new buffer
    /// of the same dtype.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn select(&self, positions: &[usize]) -> Buffer {
        let inner = for_each_variant!(
            &*self.inner,
            data => wrap positions.iter().map(|&p| data[p]).collect()
        );
        Self::wrap(inner)
    }

    /// Returns true if both handles share the same allocation.
    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Native Rust types that can be stored in an array.
///
/// Implemented for `bool`, the fixed-width integers, `f32`, `f64`, and
/// `Complex<f32>` / `Complex<f64>`. This trait is sealed.
pub trait Element: Copy + Send + Sync + std::fmt::Debug + 'static + sealed::Sealed {
    /// The dtype tag for this element type.
    const DTYPE: DType;

    #[doc(hidden)]
    fn into_buffer(data: Vec<Self>) -> Buffer;

    #[doc(hidden)]
    fn slice(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const DTYPE: DType = DType::$variant;

                fn into_buffer(data: Vec<Self>) -> Buffer {
                    Buffer::wrap(BufferInner::$variant(data))
                }

                fn slice(buffer: &Buffer) -> Option<&[Self]> {
                    match &*buffer.inner {
                        BufferInner::$variant(data) => Some(data.as_slice()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_element!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
);
