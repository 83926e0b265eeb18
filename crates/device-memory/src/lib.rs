// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-memory
//!
//! A budget-enforced arena modelling accelerator device memory, with
//! explicit host↔device transfers.
//!
//! # Key Components
//!
//! - [`DeviceBudget`] — a hard ceiling on device memory with human-readable
//!   parsing (`"64M"`, `"1G"`, etc.).
//! - [`DevicePool`] — the allocator: enforces the budget, aligns every
//!   allocation to the device's 256-byte transfer quantum, maintains a free
//!   list binned by size class, and tracks statistics.
//! - [`DeviceBuffer`] — an RAII handle to one device allocation. Data only
//!   enters or leaves through [`DeviceBuffer::upload_f32`] and
//!   [`DeviceBuffer::download_f32`]; dropping the handle returns the region
//!   to the pool.
//! - [`DeviceStats`] — cumulative allocator and transfer metrics.
//!
//! # Ownership Model
//!
//! ```text
//! DevicePool::allocate(size)
//!       │
//!       ▼
//!   DeviceBuffer  ◄─── owns the region, holds Arc<PoolInner>
//!       │
//!       │  drop()
//!       ▼
//!   PoolInner::return_region()  ──► free list
//! ```
//!
//! The pool hands out `DeviceBuffer`s; each buffer holds an `Arc` back to
//! the pool's inner state. On drop, the buffer returns its region to the
//! free list and decrements the allocated-bytes counter, so a leaked device
//! allocation is impossible without `std::mem::forget`.
//!
//! # Example
//! ```
//! use device_memory::{DevicePool, DeviceBudget};
//!
//! let pool = DevicePool::new(DeviceBudget::from_mb(8));
//!
//! // Stage an input tensor and a score vector.
//! let mut input = pool.allocate(3 * 224 * 224 * 4).unwrap();
//! let output = pool.allocate(1000 * 4).unwrap();
//!
//! input.upload_f32(&vec![0.5f32; 3 * 224 * 224]).unwrap();
//! assert_eq!(output.download_f32().unwrap().len(), 1000);
//!
//! // Regions are returned automatically.
//! drop(input);
//! drop(output);
//! assert_eq!(pool.allocated_bytes(), 0);
//! ```

mod budget;
mod buffer;
mod error;
pub mod pool;
mod stats;

pub use budget::DeviceBudget;
pub use buffer::DeviceBuffer;
pub use error::DeviceError;
pub use pool::DevicePool;
pub use stats::DeviceStats;
