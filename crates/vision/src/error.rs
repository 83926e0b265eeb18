// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for preprocessing, labels, and reporting.

/// Errors that can occur on the image and label side of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The input image could not be opened or decoded.
    #[error("failed to decode image '{path}': {detail}")]
    ImageDecode { path: String, detail: String },

    /// The class-label file could not be read.
    #[error("failed to read label file '{path}': {source}")]
    LabelRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The label list and the score vector have different lengths.
    #[error("label/score length mismatch: {labels} labels vs {scores} scores")]
    LabelCountMismatch { labels: usize, scores: usize },

    /// The score vector is empty, so there is nothing to rank.
    #[error("score vector is empty")]
    EmptyScores,
}
