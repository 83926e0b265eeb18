// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation and transfer statistics for profiling and diagnostics.
//!
//! [`DeviceStats`] tracks cumulative metrics about how device memory is
//! being used: peak usage, OOM events, free-list reuse, and how many bytes
//! crossed the host↔device boundary in each direction.

/// Cumulative statistics about device-memory usage.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DeviceStats {
    /// Total number of allocation requests.
    pub total_allocations: u64,
    /// Number of allocations served from the free list.
    pub reuse_hits: u64,
    /// Number of allocations that required a fresh region.
    pub reuse_misses: u64,
    /// Number of allocation requests that failed due to budget exhaustion.
    pub oom_count: u64,
    /// Peak live device memory in bytes.
    pub peak_allocated_bytes: usize,
    /// Total bytes ever allocated (including freed and reallocated).
    pub cumulative_allocated_bytes: u64,
    /// Total number of regions returned (drops).
    pub total_releases: u64,
    /// Number of host→device copies.
    pub uploads: u64,
    /// Number of device→host copies.
    pub downloads: u64,
    /// Total bytes copied host→device.
    pub bytes_uploaded: u64,
    /// Total bytes copied device→host.
    pub bytes_downloaded: u64,
}

impl DeviceStats {
    /// Returns the free-list reuse ratio as a fraction in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no allocations have been made.
    pub fn reuse_ratio(&self) -> f64 {
        let total = self.reuse_hits + self.reuse_misses;
        if total == 0 {
            return 0.0;
        }
        self.reuse_hits as f64 / total as f64
    }

    /// Records a successful allocation served from the free list.
    pub(crate) fn record_reuse_hit(&mut self, size: usize) {
        self.total_allocations += 1;
        self.reuse_hits += 1;
        self.cumulative_allocated_bytes += size as u64;
    }

    /// Records a successful allocation that required a fresh region.
    pub(crate) fn record_reuse_miss(&mut self, size: usize) {
        self.total_allocations += 1;
        self.reuse_misses += 1;
        self.cumulative_allocated_bytes += size as u64;
    }

    /// Records an OOM event.
    pub(crate) fn record_oom(&mut self) {
        self.total_allocations += 1;
        self.oom_count += 1;
    }

    /// Records a region returned to the pool.
    pub(crate) fn record_release(&mut self) {
        self.total_releases += 1;
    }

    /// Records a host→device copy.
    pub(crate) fn record_upload(&mut self, bytes: usize) {
        self.uploads += 1;
        self.bytes_uploaded += bytes as u64;
    }

    /// Records a device→host copy.
    pub(crate) fn record_download(&mut self, bytes: usize) {
        self.downloads += 1;
        self.bytes_downloaded += bytes as u64;
    }

    /// Updates the peak allocation high-water mark if needed.
    pub(crate) fn update_peak(&mut self, current_bytes: usize) {
        if current_bytes > self.peak_allocated_bytes {
            self.peak_allocated_bytes = current_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let peak_mb = self.peak_allocated_bytes as f64 / (1024.0 * 1024.0);
        let up_kb = self.bytes_uploaded as f64 / 1024.0;
        let down_kb = self.bytes_downloaded as f64 / 1024.0;
        format!(
            "Device: {} allocations ({} reused), {} OOMs, peak {:.2} MB, \
             {} uploads ({:.1} KB), {} downloads ({:.1} KB), {} releases",
            self.total_allocations,
            self.reuse_hits,
            self.oom_count,
            peak_mb,
            self.uploads,
            up_kb,
            self.downloads,
            down_kb,
            self.total_releases,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = DeviceStats::default();
        assert_eq!(s.total_allocations, 0);
        assert_eq!(s.reuse_ratio(), 0.0);
    }

    #[test]
    fn test_reuse_ratio() {
        let mut s = DeviceStats::default();
        s.record_reuse_hit(100);
        s.record_reuse_hit(100);
        s.record_reuse_miss(200);
        assert!((s.reuse_ratio() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_peak_tracking() {
        let mut s = DeviceStats::default();
        s.update_peak(100);
        assert_eq!(s.peak_allocated_bytes, 100);
        s.update_peak(50);
        assert_eq!(s.peak_allocated_bytes, 100); // Doesn't decrease.
        s.update_peak(200);
        assert_eq!(s.peak_allocated_bytes, 200);
    }

    #[test]
    fn test_transfer_accounting() {
        let mut s = DeviceStats::default();
        s.record_upload(4000);
        s.record_upload(4000);
        s.record_download(1000);
        assert_eq!(s.uploads, 2);
        assert_eq!(s.bytes_uploaded, 8000);
        assert_eq!(s.downloads, 1);
        assert_eq!(s.bytes_downloaded, 1000);
    }

    #[test]
    fn test_summary() {
        let mut s = DeviceStats::default();
        s.record_reuse_miss(1024 * 1024);
        s.record_upload(1024);
        s.update_peak(1024 * 1024);
        let summary = s.summary();
        assert!(summary.contains("1 allocations"));
        assert!(summary.contains("1 uploads"));
    }
}
