// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Budget-enforced device-memory pool.
//!
//! The [`DevicePool`] is the allocator behind every [`DeviceBuffer`]. It:
//!
//! 1. Enforces a hard ceiling — allocations that would exceed the budget
//!    return `Err(OutOfDeviceMemory)`.
//! 2. Aligns every allocation up to the device transfer quantum
//!    ([`DEVICE_ALIGN`]), matching how accelerator allocators hand out
//!    extents.
//! 3. Maintains a free list of returned regions, binned by size class, so
//!    repeated runs reuse extents instead of re-allocating.
//! 4. Tracks allocation and transfer statistics.
//!
//! # Thread Safety
//! `DevicePool` is `Send + Sync`; all interior mutability is behind a
//! `Mutex` or an atomic counter.

use crate::{DeviceBudget, DeviceBuffer, DeviceError, DeviceStats};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Device transfer quantum: every extent is a multiple of this.
pub const DEVICE_ALIGN: usize = 256;

/// Minimum size class for the free list: 4 KB. Anything smaller is rounded up.
const MIN_SIZE_CLASS: usize = 4096;

/// Internal pool state, shared between the pool and its buffers via `Arc`.
pub struct PoolInner {
    /// The device-memory ceiling.
    budget: DeviceBudget,
    /// Currently allocated bytes (aligned extents, live).
    allocated_bytes: AtomicUsize,
    /// Free region cache: size_class → available extents.
    free_regions: Mutex<HashMap<usize, Vec<Vec<u8>>>>,
    /// Total bytes held in the free list.
    free_list_bytes: AtomicUsize,
    /// Statistics (behind a Mutex since updates are infrequent).
    stats: Mutex<DeviceStats>,
}

impl PoolInner {
    /// Called by `DeviceBuffer::drop` to return a region to the free list.
    pub(crate) fn return_region(&self, region: Vec<u8>, len_bytes: usize) {
        let extent = aligned_extent(len_bytes);
        self.allocated_bytes.fetch_sub(extent, Ordering::Release);

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_release();
        }

        let size_class = size_class_for(extent);
        self.free_list_bytes.fetch_add(region.len(), Ordering::Release);

        if let Ok(mut free) = self.free_regions.lock() {
            free.entry(size_class).or_default().push(region);
        }
    }

    pub(crate) fn record_upload(&self, bytes: usize) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_upload(bytes);
        }
    }

    pub(crate) fn record_download(&self, bytes: usize) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_download(bytes);
        }
    }
}

/// The device-memory allocator.
///
/// # Example
/// ```
/// use device_memory::{DevicePool, DeviceBudget};
///
/// let pool = DevicePool::new(DeviceBudget::from_mb(8));
///
/// let buf = pool.allocate(1000 * 4).unwrap();
/// assert!(pool.allocated_bytes() >= 1000 * 4);
///
/// // The region is returned when the buffer is dropped.
/// drop(buf);
/// assert_eq!(pool.allocated_bytes(), 0);
/// ```
pub struct DevicePool {
    inner: Arc<PoolInner>,
}

impl DevicePool {
    /// Creates a new pool with the given budget.
    pub fn new(budget: DeviceBudget) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                budget,
                allocated_bytes: AtomicUsize::new(0),
                free_regions: Mutex::new(HashMap::new()),
                free_list_bytes: AtomicUsize::new(0),
                stats: Mutex::new(DeviceStats::default()),
            }),
        }
    }

    /// Allocates a device region of at least `len_bytes`.
    ///
    /// The extent actually reserved is `len_bytes` rounded up to
    /// [`DEVICE_ALIGN`]; the buffer's logical size stays `len_bytes`.
    /// Returns `Err(OutOfDeviceMemory)` if the aligned extent would exceed
    /// the budget. A suitable extent in the free list is reused when
    /// available; the handed-out region is always zeroed.
    pub fn allocate(&self, len_bytes: usize) -> Result<DeviceBuffer, DeviceError> {
        if len_bytes == 0 {
            return Err(DeviceError::ZeroSizedAllocation);
        }

        let extent = aligned_extent(len_bytes);

        // Check the budget against the aligned extent.
        let current = self.inner.allocated_bytes.load(Ordering::Acquire);
        let capacity = self.inner.budget.as_bytes();

        if current + extent > capacity {
            if let Ok(mut stats) = self.inner.stats.lock() {
                stats.record_oom();
            }
            return Err(DeviceError::OutOfDeviceMemory {
                requested_bytes: len_bytes,
                available_bytes: capacity.saturating_sub(current),
                capacity_bytes: capacity,
            });
        }

        // Try to reuse an extent from the free list.
        let size_class = size_class_for(extent);
        let mut region = None;

        if let Ok(mut free) = self.inner.free_regions.lock() {
            if let Some(class_regions) = free.get_mut(&size_class) {
                if let Some(mut r) = class_regions.pop() {
                    if r.len() < extent {
                        r.resize(extent, 0);
                    } else {
                        // Zero only the portion we hand out.
                        r[..extent].fill(0);
                    }
                    self.inner
                        .free_list_bytes
                        .fetch_sub(r.len().min(size_class), Ordering::Release);
                    region = Some(r);
                }
            }
        }

        let reused = region.is_some();
        let data = region.unwrap_or_else(|| vec![0u8; extent]);

        self.inner.allocated_bytes.fetch_add(extent, Ordering::Release);

        if let Ok(mut stats) = self.inner.stats.lock() {
            if reused {
                stats.record_reuse_hit(extent);
            } else {
                stats.record_reuse_miss(extent);
            }
            let new_total = self.inner.allocated_bytes.load(Ordering::Acquire);
            stats.update_peak(new_total);
        }

        Ok(DeviceBuffer::new(data, Arc::clone(&self.inner), len_bytes))
    }

    /// Returns the number of bytes currently allocated (aligned extents, live).
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Returns the number of bytes remaining before hitting the budget.
    pub fn available_bytes(&self) -> usize {
        let capacity = self.inner.budget.as_bytes();
        capacity.saturating_sub(self.allocated_bytes())
    }

    /// Returns the device-memory budget.
    pub fn budget(&self) -> DeviceBudget {
        self.inner.budget
    }

    /// Returns a snapshot of allocation and transfer statistics.
    pub fn stats(&self) -> DeviceStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Evicts all cached free regions.
    ///
    /// Does not affect currently-allocated buffers — only the free list
    /// is cleared.
    pub fn shrink(&self) {
        if let Ok(mut free) = self.inner.free_regions.lock() {
            free.clear();
            self.inner.free_list_bytes.store(0, Ordering::Release);
        }
    }

    /// Returns the approximate number of bytes held in the free list.
    pub fn free_list_bytes(&self) -> usize {
        self.inner.free_list_bytes.load(Ordering::Acquire)
    }
}

/// Rounds `len` up to the next multiple of [`DEVICE_ALIGN`].
fn aligned_extent(len: usize) -> usize {
    len.div_ceil(DEVICE_ALIGN) * DEVICE_ALIGN
}

/// Computes the size class for a given extent.
///
/// Returns the smallest power of 2 that is ≥ `extent` and ≥ `MIN_SIZE_CLASS`.
fn size_class_for(extent: usize) -> usize {
    let min = extent.max(MIN_SIZE_CLASS);
    min.next_power_of_two()
}

impl std::fmt::Debug for DevicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevicePool")
            .field("budget", &self.inner.budget)
            .field("allocated_bytes", &self.allocated_bytes())
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_drop() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let buf = pool.allocate(1024).unwrap();
        assert_eq!(pool.allocated_bytes(), 1024);
        assert_eq!(buf.len_bytes(), 1024);

        drop(buf);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_alignment() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        // 1000 bytes rounds up to the 256-byte quantum.
        let buf = pool.allocate(1000).unwrap();
        assert_eq!(pool.allocated_bytes(), 1024);
        assert_eq!(buf.len_bytes(), 1000);
    }

    #[test]
    fn test_oom() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(1024));

        let _b1 = pool.allocate(512).unwrap();
        let _b2 = pool.allocate(512).unwrap();

        let result = pool.allocate(1);
        assert!(matches!(result, Err(DeviceError::OutOfDeviceMemory { .. })));
    }

    #[test]
    fn test_zero_allocation() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let result = pool.allocate(0);
        assert!(matches!(result, Err(DeviceError::ZeroSizedAllocation)));
    }

    #[test]
    fn test_free_list_reuse() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let buf = pool.allocate(4096).unwrap();
        drop(buf);

        let _buf2 = pool.allocate(4096).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.reuse_hits, 1);
        assert_eq!(stats.reuse_misses, 1);
    }

    #[test]
    fn test_two_buffer_session() {
        // The shape of a classification run: one input tensor, one score
        // vector, both released at the end of the scope.
        let pool = DevicePool::new(DeviceBudget::from_mb(8));

        {
            let input = pool.allocate(3 * 224 * 224 * 4).unwrap();
            let output = pool.allocate(1000 * 4).unwrap();
            assert_eq!(
                pool.allocated_bytes(),
                aligned_extent(3 * 224 * 224 * 4) + aligned_extent(1000 * 4)
            );
            drop(input);
            drop(output);
        }

        assert_eq!(pool.allocated_bytes(), 0);
        let stats = pool.stats();
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_releases, 2);
    }

    #[test]
    fn test_upload_download_roundtrip() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let mut buf = pool.allocate(4 * 4).unwrap();

        buf.upload_f32(&[0.2, 0.9, 0.5, 0.1]).unwrap();
        let back = buf.download_f32().unwrap();
        assert_eq!(back, vec![0.2, 0.9, 0.5, 0.1]);

        let stats = pool.stats();
        assert_eq!(stats.uploads, 1);
        assert_eq!(stats.downloads, 1);
        assert_eq!(stats.bytes_uploaded, 16);
        assert_eq!(stats.bytes_downloaded, 16);
    }

    #[test]
    fn test_upload_size_mismatch() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let mut buf = pool.allocate(4 * 4).unwrap();

        let result = buf.upload_f32(&[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(DeviceError::TransferSizeMismatch { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn test_available_bytes() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(10240));

        assert_eq!(pool.available_bytes(), 10240);
        let _b = pool.allocate(3000).unwrap();
        // 3000 rounds up to 3072.
        assert_eq!(pool.available_bytes(), 10240 - 3072);
    }

    #[test]
    fn test_shrink() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let b = pool.allocate(8192).unwrap();
        drop(b);
        assert!(pool.free_list_bytes() > 0);

        pool.shrink();
        assert_eq!(pool.free_list_bytes(), 0);
    }

    #[test]
    fn test_stats_peak() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let b1 = pool.allocate(1024).unwrap();
        let b2 = pool.allocate(2048).unwrap();
        drop(b1);
        drop(b2);

        let stats = pool.stats();
        assert_eq!(stats.peak_allocated_bytes, 3072);
    }

    #[test]
    fn test_stats_oom_count() {
        let pool = DevicePool::new(DeviceBudget::from_bytes(100));
        let _ = pool.allocate(200);
        let _ = pool.allocate(200);

        let stats = pool.stats();
        assert_eq!(stats.oom_count, 2);
    }

    #[test]
    fn test_f32_staging_views() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));
        let mut buf = pool.allocate(16).unwrap();

        let slice = buf.as_f32_slice_mut();
        assert_eq!(slice.len(), 4);
        slice[0] = 1.0;
        slice[3] = 4.0;

        let ro = buf.as_f32_slice();
        assert_eq!(ro[0], 1.0);
        assert_eq!(ro[3], 4.0);
    }

    #[test]
    fn test_returned_region_is_zeroed() {
        let pool = DevicePool::new(DeviceBudget::from_mb(1));

        let mut b = pool.allocate(4096).unwrap();
        b.as_f32_slice_mut().fill(1.0);
        drop(b);

        let b2 = pool.allocate(4096).unwrap();
        assert!(b2.as_f32_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_aligned_extent() {
        assert_eq!(aligned_extent(1), 256);
        assert_eq!(aligned_extent(256), 256);
        assert_eq!(aligned_extent(257), 512);
        assert_eq!(aligned_extent(1000 * 4), 4096);
    }

    #[test]
    fn test_size_class() {
        assert_eq!(size_class_for(1), MIN_SIZE_CLASS);
        assert_eq!(size_class_for(4096), 4096);
        assert_eq!(size_class_for(5000), 8192);
        assert_eq!(size_class_for(1024 * 1024), 1024 * 1024);
    }

    #[test]
    fn test_debug_format() {
        let pool = DevicePool::new(DeviceBudget::from_mb(64));
        let debug = format!("{pool:?}");
        assert!(debug.contains("DevicePool"));
        assert!(debug.contains("budget"));
    }
}
