//! Core Array type for n-dimensional numeric arrays.

use crate::buffer::{Buffer, Element};
use crate::error::{Error, Result};
use crate::{BackendKind, DType, Shape};
use std::fmt;

/// A multidimensional numeric array.
///
/// # Memory Model
///
/// Arrays own their data through a shared [`Buffer`], allowing cheap cloning
/// and zero-copy views. A view (such as [`Array::transpose`]) keeps the
/// parent's buffer and only changes shape, strides and offset.
///
/// Every array is tagged with the [`BackendKind`] that owns it. The tag is
/// what a [`crate::BackendRegistry`] uses to resolve which set backend
/// handles the array.
///
/// # Examples
///
/// ```
/// # use array_set::{Array, DType, Shape};
/// let a = Array::zeros(Shape::new(vec![2, 3]), DType::Float32);
/// assert_eq!(a.shape().as_slice(), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct Array {
    /// Underlying data buffer
    buffer: Buffer,
    /// Shape of the array
    shape: Shape,
    /// Strides for indexing (in elements, not bytes)
    strides: Vec<usize>,
    /// Offset into the buffer (in elements)
    offset: usize,
    /// Backend that owns this array
    backend: BackendKind,
}

impl Array {
    /// Create a new array filled with zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// # use array_set::{Array, DType, Shape};
    /// let a = Array::zeros(Shape::new(vec![2, 3]), DType::Int16);
    /// assert_eq!(a.dtype(), DType::Int16);
    /// assert_eq!(a.to_vec::<i16>().unwrap(), vec![0; 6]);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let buffer = Buffer::zeros(shape.size(), dtype);
        Self::from_buffer(buffer, shape)
    }

    /// Create an array from flat row-major data and a shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if the shape size doesn't match the data length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use array_set::{Array, DType, Shape};
    /// let a = Array::from_vec(vec![1i32, 2, 3, 4, 5, 6], Shape::new(vec![2, 3])).unwrap();
    /// assert_eq!(a.dtype(), DType::Int32);
    /// assert!(Array::from_vec(vec![1.0f32, 2.0], Shape::new(vec![3])).is_err());
    /// ```
    pub fn from_vec<T: Element>(data: Vec<T>, shape: Shape) -> Result<Self> {
        if data.len() != shape.size() {
            return Err(Error::DataLength {
                len: data.len(),
                shape,
            });
        }
        Ok(Self::from_buffer(Buffer::from_vec(data), shape))
    }

    /// Create a one-dimensional array holding `data`.
    pub fn vector<T: Element>(data: Vec<T>) -> Self {
        let shape = Shape::vector(data.len());
        Self::from_buffer(Buffer::from_vec(data), shape)
    }

    /// Create a zero-dimensional array holding a single value.
    pub fn scalar<T: Element>(value: T) -> Self {
        Self::from_buffer(Buffer::from_vec(vec![value]), Shape::scalar())
    }

    /// Create an array from a buffer and shape (internal use).
    pub(crate) fn from_buffer(buffer: Buffer, shape: Shape) -> Self {
        debug_assert_eq!(buffer.len(), shape.size());
        let strides = shape.default_strides();
        Self {
            buffer,
            shape,
            strides,
            offset: 0,
            backend: BackendKind::default(),
        }
    }

    /// Get the shape of the array.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get the data type of the array.
    #[inline]
    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    /// Get the backend that owns this array.
    #[inline]
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Get the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Get the total number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// Check if this is a scalar (0-dimensional array).
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_scalar()
    }

    /// Returns true if the logical row-major order matches buffer order.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0
            && self.buffer.len() == self.size()
            && self.strides == self.shape.default_strides()
    }

    /// Returns the same data tagged for another backend.
    ///
    /// Buffers are host-resident for every backend, so this never copies.
    pub fn to_backend(&self, backend: BackendKind) -> Array {
        let mut out = self.clone();
        out.backend = backend;
        out
    }

    /// Builder-style variant of [`Array::to_backend`].
    pub fn with_backend(mut self, backend: BackendKind) -> Array {
        self.backend = backend;
        self
    }

    /// Buffer positions of every element, in logical row-major order.
    pub(crate) fn physical_indices(&self) -> Vec<usize> {
        let size = self.size();
        if self.is_contiguous() {
            return (0..size).collect();
        }

        let ndim = self.ndim();
        if ndim == 0 {
            return vec![self.offset];
        }

        let shape = self.shape.as_slice();
        let mut result = Vec::with_capacity(size);
        if size == 0 {
            return result;
        }

        // Iterate through all logical indices in row-major order
        let mut indices = vec![0usize; ndim];
        for _ in 0..size {
            let physical_idx: usize = self.offset
                + indices
                    .iter()
                    .zip(self.strides.iter())
                    .map(|(&i, &s)| i * s)
                    .sum::<usize>();
            result.push(physical_idx);

            // Last dimension increments first
            for d in (0..ndim).rev() {
                indices[d] += 1;
                if indices[d] < shape[d] {
                    break;
                }
                indices[d] = 0;
            }
        }

        result
    }

    /// Copy the elements out as a flat row-major `Vec<T>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DtypeMismatch`] if `T` is not this array's element type.
    ///
    /// # Examples
    ///
    /// ```
    /// # use array_set::{Array, Shape};
    /// let a = Array::from_vec(vec![1u8, 2, 3, 4], Shape::new(vec![2, 2])).unwrap();
    /// assert_eq!(a.transpose().to_vec::<u8>().unwrap(), vec![1, 3, 2, 4]);
    /// ```
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        let data = self.buffer.as_slice::<T>().ok_or(Error::DtypeMismatch {
            expected: self.dtype(),
            found: T::DTYPE,
        })?;

        // Fast path: contiguous array
        if self.is_contiguous() {
            return Ok(data.to_vec());
        }

        Ok(self.physical_indices().into_iter().map(|i| data[i]).collect())
    }

    /// Gather flat (row-major) positions into a new one-dimensional array.
    ///
    /// Positions must be smaller than [`Array::size`].
    pub(crate) fn take_flat(&self, positions: &[usize]) -> Array {
        let buffer = if self.is_contiguous() {
            self.buffer.select(positions)
        } else {
            let physical = self.physical_indices();
            let mapped: Vec<usize> = positions.iter().map(|&p| physical[p]).collect();
            self.buffer.select(&mapped)
        };
        Array::from_buffer(buffer, Shape::vector(positions.len())).with_backend(self.backend)
    }

    /// Materialize the array into a fresh contiguous buffer.
    ///
    /// Already contiguous arrays are returned as a cheap clone.
    pub fn contiguous(&self) -> Array {
        if self.is_contiguous() {
            return self.clone();
        }
        let buffer = self.buffer.select(&self.physical_indices());
        Array::from_buffer(buffer, self.shape.clone()).with_backend(self.backend)
    }

    /// Flatten to one dimension in row-major order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use array_set::{Array, Shape};
    /// let a = Array::from_vec(vec![1i64, 2, 3, 4], Shape::new(vec![2, 2])).unwrap();
    /// let flat = a.flatten();
    /// assert_eq!(flat.shape().as_slice(), &[4]);
    /// ```
    pub fn flatten(&self) -> Array {
        let base = self.contiguous();
        let size = base.size();
        Array {
            shape: Shape::vector(size),
            strides: vec![1],
            ..base
        }
    }

    /// Reshape the array to a new shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReshape`] if the total size doesn't match.
    pub fn reshape(&self, new_shape: Shape) -> Result<Array> {
        if self.size() != new_shape.size() {
            return Err(Error::InvalidReshape {
                from: self.shape.clone(),
                to: new_shape,
            });
        }
        let base = self.contiguous();
        let strides = new_shape.default_strides();
        Ok(Array {
            shape: new_shape,
            strides,
            ..base
        })
    }

    /// Reverse the axis order, returning a strided view over the same buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use array_set::{Array, Shape};
    /// let a = Array::from_vec(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(vec![2, 3])).unwrap();
    /// let t = a.transpose();
    /// assert_eq!(t.shape().as_slice(), &[3, 2]);
    /// assert_eq!(t.to_vec::<f64>().unwrap(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    /// ```
    pub fn transpose(&self) -> Array {
        Array {
            buffer: self.buffer.clone(),
            shape: self.shape.reversed(),
            strides: self.strides.iter().rev().copied().collect(),
            offset: self.offset,
            backend: self.backend,
        }
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array:{}{}@{}", self.dtype(), self.shape(), self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strided(data: Vec<f32>, shape: Vec<usize>, strides: Vec<usize>, offset: usize) -> Array {
        Array {
            buffer: Buffer::from_vec(data),
            shape: Shape::new(shape),
            strides,
            offset,
            backend: BackendKind::default(),
        }
    }

    #[test]
    fn test_array_zeros_all_dtypes() {
        for dtype in DType::ALL {
            let a = Array::zeros(Shape::new(vec![2, 3]), dtype);
            assert_eq!(a.dtype(), dtype);
            assert_eq!(a.shape().as_slice(), &[2, 3]);
            assert_eq!(a.size(), 6);
            assert_eq!(a.ndim(), 2);
        }
    }

    #[test]
    fn test_array_from_vec_typed() {
        let a = Array::from_vec(vec![-1i8, 0, 127], Shape::vector(3)).unwrap();
        assert_eq!(a.dtype(), DType::Int8);
        assert_eq!(a.to_vec::<i8>().unwrap(), vec![-1, 0, 127]);

        let b = Array::vector(vec![u64::MAX, 0]);
        assert_eq!(b.dtype(), DType::Uint64);
        assert_eq!(b.to_vec::<u64>().unwrap(), vec![u64::MAX, 0]);

        let c = Array::vector(vec![true, false, true]);
        assert_eq!(c.dtype(), DType::Bool);
        assert_eq!(c.to_vec::<bool>().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_array_from_vec_size_mismatch() {
        let err = Array::from_vec(vec![1.0f32, 2.0], Shape::vector(3)).unwrap_err();
        assert_eq!(
            err,
            Error::DataLength {
                len: 2,
                shape: Shape::vector(3)
            }
        );
    }

    #[test]
    fn test_to_vec_wrong_type() {
        let a = Array::vector(vec![1i32, 2]);
        let err = a.to_vec::<f32>().unwrap_err();
        assert_eq!(
            err,
            Error::DtypeMismatch {
                expected: DType::Int32,
                found: DType::Float32
            }
        );
    }

    #[test]
    fn test_scalar_array() {
        let a = Array::scalar(2.5f64);
        assert!(a.is_scalar());
        assert_eq!(a.size(), 1);
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![2.5]);
        assert_eq!(a.flatten().shape().as_slice(), &[1]);
    }

    #[test]
    fn test_array_reshape() {
        let data = vec![1i32, 2, 3, 4, 5, 6];
        let a = Array::from_vec(data.clone(), Shape::new(vec![2, 3])).unwrap();
        let b = a.reshape(Shape::new(vec![3, 2])).unwrap();
        assert_eq!(b.shape().as_slice(), &[3, 2]);
        assert_eq!(b.to_vec::<i32>().unwrap(), data);

        let err = a.reshape(Shape::new(vec![2, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidReshape { .. }));
    }

    #[test]
    fn test_reshape_of_view_materializes() {
        let a = Array::from_vec(vec![1i32, 2, 3, 4, 5, 6], Shape::new(vec![2, 3])).unwrap();
        let t = a.transpose();
        assert!(!t.is_contiguous());
        let flat = t.reshape(Shape::vector(6)).unwrap();
        assert!(flat.is_contiguous());
        assert_eq!(flat.to_vec::<i32>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_array_display() {
        let a = Array::zeros(Shape::new(vec![2, 3]), DType::Float32);
        assert_eq!(a.to_string(), "Array:float32(2, 3)@sorted");
    }

    #[test]
    fn test_to_backend_retags_without_copy() {
        let a = Array::vector(vec![1u16, 2]);
        let b = a.to_backend(BackendKind::Stable);
        assert_eq!(b.backend(), BackendKind::Stable);
        assert_eq!(a.backend(), BackendKind::default());
        assert!(a.buffer.ptr_eq(&b.buffer));
    }

    #[test]
    fn test_take_flat_on_view() {
        let a = Array::from_vec(vec![10i64, 20, 30, 40, 50, 60], Shape::new(vec![2, 3])).unwrap();
        let t = a.transpose();
        // t in row-major order: [10, 40, 20, 50, 30, 60]
        let picked = t.take_flat(&[1, 4, 0]);
        assert_eq!(picked.shape().as_slice(), &[3]);
        assert_eq!(picked.to_vec::<i64>().unwrap(), vec![40, 30, 10]);
    }

    #[test]
    fn test_strided_to_vec_with_offset() {
        // View: 2x3 starting at offset 2 of [0..10)
        let arr = strided((0..10).map(|x| x as f32).collect(), vec![2, 3], vec![3, 1], 2);
        assert_eq!(
            arr.to_vec::<f32>().unwrap(),
            vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn test_strided_to_vec_every_other() {
        let arr = strided((0..8).map(|x| x as f32).collect(), vec![4], vec![2], 0);
        assert_eq!(arr.to_vec::<f32>().unwrap(), vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_strided_to_vec_3d() {
        // Original shape [2, 3, 4] viewed as transposed [4, 3, 2]
        let arr = strided((0..24).map(|x| x as f32).collect(), vec![4, 3, 2], vec![1, 4, 12], 0);
        let result = arr.to_vec::<f32>().unwrap();
        assert_eq!(&result[..6], &[0.0, 12.0, 4.0, 16.0, 8.0, 20.0]);
        assert_eq!(&result[18..], &[3.0, 15.0, 7.0, 19.0, 11.0, 23.0]);
    }

    #[test]
    fn test_empty_view_has_no_positions() {
        let a = Array::zeros(Shape::new(vec![3, 0]), DType::Float64);
        let t = a.transpose();
        assert_eq!(t.size(), 0);
        assert!(t.physical_indices().is_empty());
        assert!(t.to_vec::<f64>().unwrap().is_empty());
    }
}
