// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device-memory management.

/// Errors that can occur during device allocation and host↔device transfer.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The requested allocation would exceed the device-memory budget.
    #[error("out of device memory: requested {requested_bytes} bytes, but only {available_bytes} available (capacity: {capacity_bytes})")]
    OutOfDeviceMemory {
        requested_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// Attempted to allocate a zero-sized region.
    #[error("cannot allocate zero-sized device region")]
    ZeroSizedAllocation,

    /// A host↔device copy was attempted with mismatched sizes.
    #[error("transfer size mismatch: device region holds {expected} bytes, host buffer holds {actual}")]
    TransferSizeMismatch { expected: usize, actual: usize },

    /// The device-memory capacity string could not be parsed.
    #[error("invalid device-memory capacity: {0}")]
    InvalidCapacity(String),
}
