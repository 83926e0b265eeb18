// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inference timing metrics.
//!
//! [`InferenceMetrics`] collects the wall-clock timings of a benchmark
//! run: one entry per execute call plus the host↔device transfer costs.
//! Durations are reported as plain elapsed milliseconds.

use std::time::Duration;

/// Timing for a single execute call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IterationTiming {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Wall-clock duration of the synchronous execute call.
    pub duration: Duration,
}

impl IterationTiming {
    /// Returns the duration in milliseconds.
    pub fn as_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Aggregate metrics for a complete benchmark run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InferenceMetrics {
    /// Host→device copy time for the input tensor.
    pub upload_duration: Duration,
    /// Bytes copied host→device.
    pub bytes_uploaded: usize,
    /// Device→host copy time for the score vector.
    pub download_duration: Duration,
    /// Bytes copied device→host.
    pub bytes_downloaded: usize,
    /// Per-iteration execute timings.
    pub iterations: Vec<IterationTiming>,
    /// Total wall-clock time for the whole run (transfers included).
    pub total_duration: Duration,
}

impl InferenceMetrics {
    /// Creates an empty metrics container for `iterations` execute calls.
    pub fn new(iterations: usize) -> Self {
        Self {
            upload_duration: Duration::ZERO,
            bytes_uploaded: 0,
            download_duration: Duration::ZERO,
            bytes_downloaded: 0,
            iterations: Vec::with_capacity(iterations),
            total_duration: Duration::ZERO,
        }
    }

    /// Records the input upload.
    pub fn record_upload(&mut self, duration: Duration, bytes: usize) {
        self.upload_duration = duration;
        self.bytes_uploaded = bytes;
    }

    /// Records the score download.
    pub fn record_download(&mut self, duration: Duration, bytes: usize) {
        self.download_duration = duration;
        self.bytes_downloaded = bytes;
    }

    /// Records one execute call.
    pub fn record_iteration(&mut self, iteration: usize, duration: Duration) {
        self.iterations.push(IterationTiming {
            iteration,
            duration,
        });
    }

    /// Finalises metrics with the total wall-clock time.
    pub fn finalise(&mut self, total: Duration) {
        self.total_duration = total;
    }

    /// Returns the mean execute time in milliseconds, or 0.0 if no
    /// iterations were recorded.
    pub fn mean_ms(&self) -> f64 {
        if self.iterations.is_empty() {
            return 0.0;
        }
        let total: f64 = self.iterations.iter().map(IterationTiming::as_ms).sum();
        total / self.iterations.len() as f64
    }

    /// Returns the fastest execute time in milliseconds, or 0.0 if no
    /// iterations were recorded.
    pub fn min_ms(&self) -> f64 {
        if self.iterations.is_empty() {
            return 0.0;
        }
        self.iterations
            .iter()
            .map(IterationTiming::as_ms)
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns the slowest execute time in milliseconds.
    pub fn max_ms(&self) -> f64 {
        self.iterations
            .iter()
            .map(IterationTiming::as_ms)
            .fold(0.0, f64::max)
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Inference: {} iterations, {:.2}ms mean ({:.2}ms min, {:.2}ms max), \
             upload {:.2}ms ({} B), download {:.2}ms ({} B), {:.2}ms total",
            self.iterations.len(),
            self.mean_ms(),
            self.min_ms(),
            self.max_ms(),
            self.upload_duration.as_secs_f64() * 1000.0,
            self.bytes_uploaded,
            self.download_duration.as_secs_f64() * 1000.0,
            self.bytes_downloaded,
            self.total_duration.as_secs_f64() * 1000.0,
        )
    }
}
