// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII device buffer with explicit host↔device transfers.
//!
//! [`DeviceBuffer`] stands in for a region of accelerator memory. Data
//! never moves implicitly: the host writes a region with
//! [`upload_f32`](DeviceBuffer::upload_f32) and reads it back with
//! [`download_f32`](DeviceBuffer::download_f32), both of which are size
//! checked. Dropping the buffer returns the region to the
//! [`DevicePool`](crate::DevicePool), so release points are tied to scope
//! rather than to a manually-paired free call.

use crate::pool::PoolInner;
use crate::DeviceError;
use std::sync::Arc;

/// An RAII handle to one allocated device-memory region.
///
/// The region's logical size is fixed at allocation time; the underlying
/// extent may be larger because the pool aligns allocations to the device
/// transfer quantum.
///
/// # Example
/// ```ignore
/// let mut buf = pool.allocate(1000 * 4)?;
/// buf.upload_f32(&scores)?;        // host → device
/// let back = buf.download_f32()?;  // device → host
/// drop(buf);                       // region returned to pool
/// ```
pub struct DeviceBuffer {
    /// The staged region. Wrapped in `Option` so we can `take()` it in `drop()`.
    region: Option<Vec<u8>>,
    /// Handle back to the pool for release tracking.
    pool: Arc<PoolInner>,
    /// Logical size of this allocation in bytes (before alignment padding).
    len_bytes: usize,
}

impl DeviceBuffer {
    /// Creates a new buffer (called internally by the pool).
    pub(crate) fn new(region: Vec<u8>, pool: Arc<PoolInner>, len_bytes: usize) -> Self {
        Self {
            region: Some(region),
            pool,
            len_bytes,
        }
    }

    /// Returns the logical size of this allocation in bytes.
    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    /// Copies a host slice into the device region.
    ///
    /// The host buffer must match the region's logical size exactly;
    /// partial writes are not a thing the transfer engine supports.
    pub fn upload_f32(&mut self, host: &[f32]) -> Result<(), DeviceError> {
        let host_bytes = host.len() * 4;
        if host_bytes != self.len_bytes {
            return Err(DeviceError::TransferSizeMismatch {
                expected: self.len_bytes,
                actual: host_bytes,
            });
        }

        // SAFETY: reinterpreting &[f32] as &[u8] is safe for Copy types.
        let src = unsafe { std::slice::from_raw_parts(host.as_ptr() as *const u8, host_bytes) };
        self.region_mut()[..host_bytes].copy_from_slice(src);
        self.pool.record_upload(host_bytes);
        Ok(())
    }

    /// Copies the device region back into a freshly allocated host vector.
    ///
    /// # Errors
    /// Returns [`DeviceError::TransferSizeMismatch`] if the region's
    /// logical size is not a whole number of `f32` elements.
    pub fn download_f32(&self) -> Result<Vec<f32>, DeviceError> {
        if self.len_bytes % 4 != 0 {
            return Err(DeviceError::TransferSizeMismatch {
                expected: (self.len_bytes / 4) * 4,
                actual: self.len_bytes,
            });
        }

        let mut host = vec![0f32; self.len_bytes / 4];
        // SAFETY: as above, in the other direction.
        let dst = unsafe {
            std::slice::from_raw_parts_mut(host.as_mut_ptr() as *mut u8, self.len_bytes)
        };
        dst.copy_from_slice(&self.region()[..self.len_bytes]);
        self.pool.record_download(self.len_bytes);
        Ok(host)
    }

    /// Interprets the staged region as a slice of `f32`.
    ///
    /// This is the in-place view the execution path hands to the engine;
    /// it does not count as a transfer.
    ///
    /// # Panics
    /// Panics if the logical size is not a multiple of 4.
    pub fn as_f32_slice(&self) -> &[f32] {
        assert!(
            self.len_bytes % 4 == 0,
            "region size {} is not a multiple of 4",
            self.len_bytes
        );
        let bytes = &self.region()[..self.len_bytes];
        unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const f32, bytes.len() / 4) }
    }

    /// Interprets the staged region as a mutable slice of `f32`.
    ///
    /// # Panics
    /// Panics if the logical size is not a multiple of 4.
    pub fn as_f32_slice_mut(&mut self) -> &mut [f32] {
        assert!(
            self.len_bytes % 4 == 0,
            "region size {} is not a multiple of 4",
            self.len_bytes
        );
        let len = self.len_bytes;
        let bytes = &mut self.region_mut()[..len];
        unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut f32, bytes.len() / 4) }
    }

    // ── Private helpers ────────────────────────────────────────

    fn region(&self) -> &[u8] {
        self.region.as_ref().expect("region already returned")
    }

    fn region_mut(&mut self) -> &mut Vec<u8> {
        self.region.as_mut().expect("region already returned")
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        if let Some(region) = self.region.take() {
            self.pool.return_region(region, self.len_bytes);
        }
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len_bytes", &self.len_bytes)
            .field("live", &self.region.is_some())
            .finish()
    }
}
