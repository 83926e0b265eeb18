// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Class-label storage.
//!
//! The label file is newline-delimited UTF-8, one label per line, ordinal
//! position = class index. It is read once into a [`LabelStore`] and the
//! store is passed explicitly into the reporter, so every consumer shares
//! the same snapshot and the file is never re-read per lookup.

use crate::VisionError;
use std::io::BufRead;
use std::path::Path;

/// An ordered list of class labels, index = class id.
#[derive(Debug, Clone)]
pub struct LabelStore {
    labels: Vec<String>,
}

impl LabelStore {
    /// Reads labels from a newline-delimited UTF-8 file.
    pub fn from_file(path: &Path) -> Result<Self, VisionError> {
        let file = std::fs::File::open(path).map_err(|source| VisionError::LabelRead {
            path: path.display().to_string(),
            source,
        })?;

        let labels = std::io::BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| VisionError::LabelRead {
                path: path.display().to_string(),
                source,
            })?;

        tracing::debug!("loaded {} labels from {}", labels.len(), path.display());
        Ok(Self { labels })
    }

    /// Builds a store from in-memory labels.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the store holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the label for a class index, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Returns all labels in class-index order.
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_labels.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "cat").unwrap();
        writeln!(f, "dog").unwrap();
        writeln!(f, "bird").unwrap();
        drop(f);

        let store = LabelStore::from_file(&path).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0), Some("cat"));
        assert_eq!(store.get(2), Some("bird"));
        assert_eq!(store.get(3), None);
    }

    #[test]
    fn test_missing_file() {
        let result = LabelStore::from_file(Path::new("/nonexistent/class_labels.txt"));
        assert!(matches!(result, Err(VisionError::LabelRead { .. })));
    }

    #[test]
    fn test_from_lines() {
        let store = LabelStore::from_lines(["a", "b"]);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_store() {
        let store = LabelStore::from_lines(Vec::<String>::new());
        assert!(store.is_empty());
        assert_eq!(store.get(0), None);
    }
}
