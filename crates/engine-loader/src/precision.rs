// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine precision modes.
//!
//! Precision is chosen when the artifact is compiled, not at inference
//! time. Selecting a precision here only changes which default artifact
//! path is used; a compiled engine always runs in the mode it was built
//! with.

use std::path::{Path, PathBuf};
use tensor_core::DType;

/// The numeric representation an engine artifact was compiled with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 8-bit integer (quantised).
    Int8,
    /// 16-bit floating point.
    Fp16,
    /// 32-bit floating point. The default when no precision is selected.
    #[default]
    Fp32,
}

impl Precision {
    /// Returns the canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Int8 => "int8",
            Precision::Fp16 => "fp16",
            Precision::Fp32 => "fp32",
        }
    }

    /// Parses a precision from a configuration string.
    ///
    /// Accepts the canonical labels plus common aliases (`"8"`, `"16"`,
    /// `"32"`, `"half"`, `"float"`). Case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "int8" | "i8" | "8" => Some(Self::Int8),
            "fp16" | "f16" | "16" | "half" => Some(Self::Fp16),
            "fp32" | "f32" | "32" | "float" => Some(Self::Fp32),
            _ => None,
        }
    }

    /// Returns the element type this precision corresponds to.
    pub fn dtype(self) -> DType {
        match self {
            Precision::Int8 => DType::I8,
            Precision::Fp16 => DType::F16,
            Precision::Fp32 => DType::F32,
        }
    }

    /// Returns the default artifact path for this precision inside `dir`.
    ///
    /// The offline compilation step writes one artifact per precision,
    /// named `resnet50_<precision>.onnx`.
    pub fn default_artifact(self, dir: &Path) -> PathBuf {
        dir.join(format!("resnet50_{}.onnx", self.as_str()))
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fp32() {
        assert_eq!(Precision::default(), Precision::Fp32);
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(Precision::from_str_loose("int8"), Some(Precision::Int8));
        assert_eq!(Precision::from_str_loose("8"), Some(Precision::Int8));
        assert_eq!(Precision::from_str_loose("FP16"), Some(Precision::Fp16));
        assert_eq!(Precision::from_str_loose("half"), Some(Precision::Fp16));
        assert_eq!(Precision::from_str_loose("fp32"), Some(Precision::Fp32));
        assert_eq!(Precision::from_str_loose(" float "), Some(Precision::Fp32));
        assert_eq!(Precision::from_str_loose("bf16"), None);
    }

    #[test]
    fn test_dtype() {
        assert_eq!(Precision::Int8.dtype(), DType::I8);
        assert_eq!(Precision::Fp16.dtype(), DType::F16);
        assert_eq!(Precision::Fp32.dtype(), DType::F32);
    }

    #[test]
    fn test_default_artifact_paths() {
        let dir = Path::new("data");
        assert_eq!(
            Precision::Fp32.default_artifact(dir),
            PathBuf::from("data/resnet50_fp32.onnx")
        );
        assert_eq!(
            Precision::Fp16.default_artifact(dir),
            PathBuf::from("data/resnet50_fp16.onnx")
        );
        assert_eq!(
            Precision::Int8.default_artifact(dir),
            PathBuf::from("data/resnet50_int8.onnx")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Precision::Int8), "int8");
    }
}
