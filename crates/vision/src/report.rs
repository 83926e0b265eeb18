// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Top-N ranking and argmax over the engine's score vector.
//!
//! The reporter is a pure function: it returns the ranking and best label
//! as values and leaves display entirely to the caller.

use crate::{LabelStore, VisionError};

/// One entry of the ranked report.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLabel {
    /// Class index into the label file.
    pub index: usize,
    /// Class label text.
    pub label: String,
    /// Raw engine score for this class.
    pub score: f32,
}

/// The result of ranking a score vector against a label list.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The `min(top_n, num_classes)` best classes, sorted non-increasing
    /// by score. Equal scores keep their original index order.
    pub top: Vec<RankedLabel>,
    /// The single best class (first occurrence wins on ties).
    pub best: RankedLabel,
}

/// Ranks `scores` against `labels` and returns the top `top_n` classes
/// plus the argmax.
///
/// # Errors
/// Returns [`VisionError::LabelCountMismatch`] if the label list and score
/// vector differ in length, and [`VisionError::EmptyScores`] if both are
/// empty. Neither case ever indexes out of bounds.
///
/// # Examples
/// ```
/// use vision::{rank, LabelStore};
///
/// let labels = LabelStore::from_lines(["cat", "dog", "bird"]);
/// let report = rank(&[0.2, 0.9, 0.5], &labels, 2).unwrap();
///
/// assert_eq!(report.best.label, "dog");
/// assert_eq!(report.top.len(), 2);
/// assert_eq!(report.top[0].label, "dog");
/// assert_eq!(report.top[1].label, "bird");
/// ```
pub fn rank(
    scores: &[f32],
    labels: &LabelStore,
    top_n: usize,
) -> Result<Classification, VisionError> {
    if scores.len() != labels.len() {
        return Err(VisionError::LabelCountMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if scores.is_empty() {
        return Err(VisionError::EmptyScores);
    }

    // NaN scores are ranked as if they were -∞ so the comparator stays a
    // total order (required by `sort_by`) and a NaN can never win.
    let effective = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s };

    // Stable sort over an index permutation: descending by score, equal
    // scores keep ascending index order.
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        effective(scores[b])
            .partial_cmp(&effective(scores[a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top = indices
        .iter()
        .take(top_n)
        .map(|&i| RankedLabel {
            index: i,
            label: labels.get(i).expect("index in range by length check").to_string(),
            score: scores[i],
        })
        .collect();

    // Argmax with first-occurrence-wins tie breaking.
    let mut best_idx = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if effective(s) > effective(scores[best_idx]) {
            best_idx = i;
        }
    }
    let best = RankedLabel {
        index: best_idx,
        label: labels
            .get(best_idx)
            .expect("index in range by length check")
            .to_string(),
        score: scores[best_idx],
    };

    Ok(Classification { top, best })
}
