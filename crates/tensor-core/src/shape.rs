// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use std::fmt;

/// Describes the dimensionality of a [`crate::Tensor`] or an engine binding.
///
/// Shapes are immutable once created. The pipeline mostly deals in two of
/// them: the channel-major image tensor (`[C, H, W]`, possibly with a
/// leading batch dimension of 1 on the engine side) and the flat score
/// vector (`[num_classes]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![1, 3, 224, 224]);
    /// assert_eq!(s.rank(), 4);
    /// assert_eq!(s.num_elements(), 3 * 224 * 224);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a 1-D shape (e.g., the score vector).
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a channel-major image shape `[channels, height, width]`.
    pub fn chw(channels: usize, height: usize, width: usize) -> Self {
        Self {
            dims: vec![channels, height, width],
        }
    }

    /// Returns this shape with a leading batch dimension of 1 prepended.
    ///
    /// Engine bindings carry an explicit batch dimension; host tensors in
    /// this single-image pipeline do not.
    pub fn batched(&self) -> Self {
        let mut dims = Vec::with_capacity(self.dims.len() + 1);
        dims.push(1);
        dims.extend_from_slice(&self.dims);
        Self { dims }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a rank-0 shape, returns 1.
    pub fn num_elements(&self) -> usize {
        if self.dims.is_empty() {
            1
        } else {
            self.dims.iter().product()
        }
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }

    /// Returns `true` if `other` is this shape with or without a leading
    /// batch dimension of 1.
    ///
    /// The engine reports `[1, 3, 224, 224]` while the preprocessor
    /// produces `[3, 224, 224]`; both describe the same buffer.
    pub fn matches_unbatched(&self, other: &Shape) -> bool {
        if self.dims == other.dims {
            return true;
        }
        fn strip(d: &[usize]) -> &[usize] {
            if d.len() > 1 && d[0] == 1 {
                &d[1..]
            } else {
                d
            }
        }
        strip(&self.dims) == strip(&other.dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![3, 224, 224])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[3, 224, 224][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}
