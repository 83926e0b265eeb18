// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for engine loading and execution.

/// Errors that can occur when loading or invoking an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine artifact file could not be read.
    #[error("failed to read engine artifact '{path}': {source}")]
    ArtifactRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The artifact bytes could not be deserialized into an executable engine.
    #[error("engine deserialization failed: {0}")]
    DeserializeFailed(String),

    /// The artifact deserialized, but its I/O surface is not what a
    /// single-image classifier exposes.
    #[error("unsupported engine model: {0}")]
    UnsupportedModel(String),

    /// A binding with the given name does not exist on this engine.
    #[error("binding not found: '{name}'")]
    BindingNotFound { name: String },

    /// A host buffer does not match the element count of its binding.
    #[error("binding '{binding}' size mismatch: expected {expected} elements, got {actual}")]
    BindingSizeMismatch {
        binding: String,
        expected: usize,
        actual: usize,
    },

    /// The engine's execute call failed.
    #[error("engine execution failed: {0}")]
    ExecutionFailed(String),
}
