// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine I/O binding metadata.
//!
//! A deserialized engine reports its tensor surface as a set of named
//! bindings. Consumers resolve bindings by name (or by kind, since a
//! classifier has exactly one of each) rather than assuming positional
//! indices, so a re-exported artifact with a different binding order
//! cannot silently mismatch buffers.

use tensor_core::{DType, Shape};

/// Whether a binding is fed by the host or produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Host-supplied tensor (the preprocessed image).
    Input,
    /// Engine-produced tensor (the score vector).
    Output,
}

impl BindingKind {
    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            BindingKind::Input => "input",
            BindingKind::Output => "output",
        }
    }
}

/// Metadata for one engine I/O tensor.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Binding name as reported by the engine.
    pub name: String,
    /// Input or output.
    pub kind: BindingKind,
    /// Tensor shape, including the leading batch dimension.
    pub shape: Shape,
    /// Element type on the host side of the transfer.
    pub dtype: DType,
}

impl Binding {
    /// Returns the number of elements in this binding's tensor.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the host-side buffer size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' {} {}",
            self.kind.as_str(),
            self.name,
            self.shape,
            self.dtype
        )
    }
}
