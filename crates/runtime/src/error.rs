// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference runtime.
//!
//! Every accelerator-facing step surfaces a distinct error kind, and the
//! policy on all of them is the same: fail fast, no retry, no partial
//! result.

use device_memory::DeviceError;
use engine_loader::EngineError;
use tensor_core::Shape;

/// Errors that can occur while configuring or running inference.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Configuration is invalid or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Engine loading or deserialization failed.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Allocating a device buffer failed.
    #[error("device allocation failed: {0}")]
    DeviceAllocationFailed(#[source] DeviceError),

    /// A host↔device copy failed.
    #[error("transfer failed: {0}")]
    TransferFailed(#[source] DeviceError),

    /// The engine's execute call failed.
    #[error("execution failed on iteration {iteration}: {source}")]
    ExecutionFailed {
        iteration: usize,
        #[source]
        source: EngineError,
    },

    /// The input tensor does not match the engine's input binding.
    #[error("input shape mismatch: engine expects {expected}, got {actual}")]
    InputShapeMismatch { expected: Shape, actual: Shape },

    /// The engine's output binding does not hold one score per class.
    #[error("output size mismatch: expected {expected} classes, engine reports {actual}")]
    OutputSizeMismatch { expected: usize, actual: usize },
}
