// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! Every knob the pipeline reads lives here and is passed explicitly into
//! the component that needs it — there are no file-scope tunables anywhere
//! else in the workspace.
//!
//! # TOML Format
//! ```toml
//! artifact_dir = "data"
//! precision = "fp32"
//! image_path = "data/binoculars.jpeg"
//! labels_path = "data/class_labels.txt"
//! iterations = 5
//! top_n = 10
//! input_dims = [3, 224, 224]
//! num_classes = 1000
//! device_memory = "64M"
//! ```

use device_memory::DeviceBudget;
use engine_loader::Precision;
use std::path::{Path, PathBuf};
use tensor_core::Shape;

/// Configuration for one classification run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Directory holding the per-precision default engine artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    /// Explicit engine artifact path. Overrides the precision default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_path: Option<PathBuf>,
    /// Engine precision mode (selects the default artifact path).
    #[serde(default)]
    pub precision: Precision,
    /// Input image path.
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,
    /// Class-label file path.
    #[serde(default = "default_labels_path")]
    pub labels_path: PathBuf,
    /// Number of timed execute calls.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Number of ranked labels to report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Model input dimensions, channel-major `[C, H, W]`.
    #[serde(default = "default_input_dims")]
    pub input_dims: Vec<usize>,
    /// Number of classes in the score vector (and lines in the label file).
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
    /// Device-memory capacity (human-readable, e.g., `"64M"`).
    #[serde(default = "default_device_memory")]
    pub device_memory: String,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_image_path() -> PathBuf {
    PathBuf::from("data/binoculars.jpeg")
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("data/class_labels.txt")
}

fn default_iterations() -> usize {
    5
}

fn default_top_n() -> usize {
    5
}

fn default_input_dims() -> Vec<usize> {
    vec![3, 224, 224]
}

fn default_num_classes() -> usize {
    1000
}

fn default_device_memory() -> String {
    "64M".to_string()
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks that the configuration is internally consistent.
    pub fn validate(&self) -> Result<(), super::RuntimeError> {
        if self.iterations == 0 {
            return Err(super::RuntimeError::Config(
                "iterations must be at least 1".into(),
            ));
        }
        if self.top_n == 0 {
            return Err(super::RuntimeError::Config("top_n must be at least 1".into()));
        }
        if self.input_dims.len() != 3 || self.input_dims.iter().any(|&d| d == 0) {
            return Err(super::RuntimeError::Config(format!(
                "input_dims must be three non-zero values [C, H, W], got {:?}",
                self.input_dims,
            )));
        }
        if self.num_classes == 0 {
            return Err(super::RuntimeError::Config(
                "num_classes must be at least 1".into(),
            ));
        }
        DeviceBudget::parse(&self.device_memory)
            .map_err(|e| super::RuntimeError::Config(format!("invalid device_memory: {e}")))?;
        Ok(())
    }

    /// Resolves the engine artifact path.
    ///
    /// An explicit `engine_path` wins; otherwise the per-precision default
    /// inside `artifact_dir` is used.
    pub fn resolve_engine_path(&self) -> PathBuf {
        match &self.engine_path {
            Some(path) => path.clone(),
            None => self.precision.default_artifact(&self.artifact_dir),
        }
    }

    /// Returns the channel-major input shape `[C, H, W]`.
    pub fn input_shape(&self) -> Shape {
        Shape::new(self.input_dims.clone())
    }

    /// Parses the device-memory capacity string into a [`DeviceBudget`].
    pub fn parse_device_budget(&self) -> Result<DeviceBudget, super::RuntimeError> {
        DeviceBudget::parse(&self.device_memory)
            .map_err(|e| super::RuntimeError::Config(format!("invalid device_memory: {e}")))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
            engine_path: None,
            precision: Precision::default(),
            image_path: default_image_path(),
            labels_path: default_labels_path(),
            iterations: default_iterations(),
            top_n: default_top_n(),
            input_dims: default_input_dims(),
            num_classes: default_num_classes(),
            device_memory: default_device_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.precision, Precision::Fp32);
        assert_eq!(c.iterations, 5);
        assert_eq!(c.top_n, 5);
        assert_eq!(c.num_classes, 1000);
        assert_eq!(c.input_dims, vec![3, 224, 224]);
        c.validate().unwrap();
    }

    #[test]
    fn test_engine_path_defaults_to_fp32() {
        let c = RuntimeConfig::default();
        assert_eq!(
            c.resolve_engine_path(),
            PathBuf::from("data/resnet50_fp32.onnx")
        );
    }

    #[test]
    fn test_engine_path_follows_precision() {
        let c = RuntimeConfig {
            precision: Precision::Int8,
            ..Default::default()
        };
        assert_eq!(
            c.resolve_engine_path(),
            PathBuf::from("data/resnet50_int8.onnx")
        );
    }

    #[test]
    fn test_explicit_engine_path_wins() {
        let c = RuntimeConfig {
            precision: Precision::Fp16,
            engine_path: Some(PathBuf::from("/models/custom.onnx")),
            ..Default::default()
        };
        assert_eq!(c.resolve_engine_path(), PathBuf::from("/models/custom.onnx"));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
precision = "fp16"
image_path = "/tmp/cat.jpeg"
iterations = 3
top_n = 10
device_memory = "128M"
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.precision, Precision::Fp16);
        assert_eq!(c.image_path, PathBuf::from("/tmp/cat.jpeg"));
        assert_eq!(c.iterations, 3);
        assert_eq!(c.top_n, 10);
        // Unspecified fields keep their defaults.
        assert_eq!(c.num_classes, 1000);
        assert_eq!(c.labels_path, PathBuf::from("data/class_labels.txt"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig::default();
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.precision, c.precision);
        assert_eq!(back.iterations, c.iterations);
        assert_eq!(back.device_memory, c.device_memory);
    }

    #[test]
    fn test_validate_zero_iterations() {
        let c = RuntimeConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(crate::RuntimeError::Config(_))));
    }

    #[test]
    fn test_validate_bad_dims() {
        let c = RuntimeConfig {
            input_dims: vec![3, 224],
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = RuntimeConfig {
            input_dims: vec![3, 0, 224],
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_bad_budget() {
        let c = RuntimeConfig {
            device_memory: "lots".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_input_shape() {
        let c = RuntimeConfig::default();
        assert_eq!(c.input_shape().num_elements(), 3 * 224 * 224);
    }

    #[test]
    fn test_from_file_missing() {
        let result = RuntimeConfig::from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(crate::RuntimeError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "precision = \"int8\"\niterations = 2\n").unwrap();

        let c = RuntimeConfig::from_file(&path).unwrap();
        assert_eq!(c.precision, Precision::Int8);
        assert_eq!(c.iterations, 2);
    }
}
