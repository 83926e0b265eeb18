// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core host tensor type.

use crate::{DType, Shape, TensorError};

/// An owned, contiguous host tensor.
///
/// `Tensor` is the data carrier between pipeline stages on the host side:
/// the preprocessor produces one, the runner uploads its contents to device
/// memory, and the downloaded score vector comes back as one.
///
/// # Memory Layout
/// Data is stored in row-major (C) order as a flat byte buffer. For the
/// image tensor that means channel-major `C×H×W`.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::vector(1000), DType::F32);
    /// assert_eq!(t.size_bytes(), 4000);
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            shape,
            dtype,
            data: vec![0u8; size],
        }
    }

    /// Creates a tensor from raw bytes.
    ///
    /// Returns an error if the buffer size does not match `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape.size_bytes(dtype);
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, dtype, data })
    }

    /// Creates an `F32` tensor from a slice of values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[0.2, 0.9, 0.5]).unwrap();
    /// assert_eq!(t.as_f32_slice(), &[0.2, 0.9, 0.5]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        let expected_elements = shape.num_elements();
        if values.len() != expected_elements {
            return Err(TensorError::BufferSizeMismatch {
                expected: expected_elements * DType::F32.size_bytes(),
                actual: values.len() * DType::F32.size_bytes(),
            });
        }
        // SAFETY: reinterpreting &[f32] as &[u8] is safe for Copy types.
        let byte_slice = unsafe {
            std::slice::from_raw_parts(values.as_ptr() as *const u8, values.len() * 4)
        };
        Ok(Self {
            shape,
            dtype: DType::F32,
            data: byte_slice.to_vec(),
        })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the size of the underlying buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Returns the raw byte buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Interprets the buffer as a slice of `f32`.
    ///
    /// # Panics
    /// Panics if the tensor's dtype is not `F32`.
    pub fn as_f32_slice(&self) -> &[f32] {
        assert_eq!(self.dtype, DType::F32, "tensor dtype is {}", self.dtype);
        // SAFETY: the buffer was built from f32 values (or zeroed) and its
        // length is a multiple of 4 by construction.
        unsafe {
            std::slice::from_raw_parts(self.data.as_ptr() as *const f32, self.data.len() / 4)
        }
    }

    /// Interprets the buffer as a mutable slice of `f32`.
    ///
    /// # Panics
    /// Panics if the tensor's dtype is not `F32`.
    pub fn as_f32_slice_mut(&mut self) -> &mut [f32] {
        assert_eq!(self.dtype, DType::F32, "tensor dtype is {}", self.dtype);
        // SAFETY: as above.
        unsafe {
            std::slice::from_raw_parts_mut(self.data.as_mut_ptr() as *mut f32, self.data.len() / 4)
        }
    }
}
