// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Image decoding and tensor preparation.
//!
//! The engine consumes a channel-major `C×H×W` f32 tensor. The decoder
//! hands back interleaved `H×W×C` u8 pixels, so preprocessing is:
//! decode → resize to the model resolution → scale by 1/255 → repack to
//! channel-major.
//!
//! Pixel scale is 1/255 only; channelwise ImageNet mean/std normalisation
//! is not applied. The engine artifacts this pipeline ships with were
//! compiled against the same convention.

use crate::VisionError;
use std::path::Path;
use tensor_core::{Shape, Tensor};

/// The fixed input resolution of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageDims {
    /// Colour channels (always 3 for RGB input).
    pub channels: usize,
    /// Input height in pixels.
    pub height: usize,
    /// Input width in pixels.
    pub width: usize,
}

impl Default for ImageDims {
    fn default() -> Self {
        Self {
            channels: 3,
            height: 224,
            width: 224,
        }
    }
}

impl ImageDims {
    /// Returns the channel-major tensor shape for these dimensions.
    pub fn shape(&self) -> Shape {
        Shape::chw(self.channels, self.height, self.width)
    }

    /// Returns the total element count (`C×H×W`).
    pub fn num_elements(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// Decodes `path` and prepares it as a model input tensor.
///
/// The image is unconditionally resized to `dims` (no cropping, aspect
/// ratio not preserved) with triangle filtering, so the output always
/// holds exactly `C×H×W` values regardless of the source resolution.
pub fn preprocess(path: &Path, dims: &ImageDims) -> Result<Tensor, VisionError> {
    let img = image::open(path)
        .map_err(|e| VisionError::ImageDecode {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?
        .to_rgb8();

    tracing::debug!(
        "decoded {} ({}x{}), resizing to {}x{}",
        path.display(),
        img.width(),
        img.height(),
        dims.width,
        dims.height,
    );

    let resized = image::imageops::resize(
        &img,
        dims.width as u32,
        dims.height as u32,
        image::imageops::FilterType::Triangle,
    );

    // Interleaved u8 → channel-major f32 in [0, 1].
    let chw = ndarray::Array3::from_shape_fn(
        (dims.channels, dims.height, dims.width),
        |(c, y, x)| f32::from(resized[(x as u32, y as u32)][c]) / 255.0,
    );

    let (data, _) = chw.into_raw_vec_and_offset();
    Ok(Tensor::from_f32(dims.shape(), &data).expect("CHW buffer matches its own shape"))
}
