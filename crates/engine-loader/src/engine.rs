// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The opaque engine seam and its artifact loader.
//!
//! [`EngineLoader`] reads a serialized artifact into memory and hands the
//! bytes to the runtime's engine factory, which deserializes, optimizes,
//! and plans the model. The result is a [`TractEngine`] — a ready-to-
//! execute handle whose internals (graph optimization, kernel selection,
//! memory planning) are entirely the factory's business.
//!
//! Failure policy is fail-fast: an unreadable file or a failed
//! deserialization is a typed error and the caller is expected to abort.
//! There is no retry and no fallback precision.

use crate::{Binding, BindingKind, EngineError};
use std::path::Path;
use tensor_core::{DType, Shape};
use tract_onnx::prelude::*;

/// The black-box execution capability of a loaded engine.
///
/// An engine exposes exactly one input binding (the image tensor) and one
/// output binding (the score vector); both are discovered from the
/// deserialized model's own I/O metadata. `execute` runs the whole
/// compiled graph synchronously, blocking until the scores are ready.
pub trait Engine: Send {
    /// Returns all I/O bindings this engine exposes.
    fn bindings(&self) -> &[Binding];

    /// Looks up a binding by name.
    fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings().iter().find(|b| b.name == name)
    }

    /// Returns the input binding, if the engine exposes one.
    fn input_binding(&self) -> Option<&Binding> {
        self.bindings().iter().find(|b| b.kind == BindingKind::Input)
    }

    /// Returns the output binding, if the engine exposes one.
    fn output_binding(&self) -> Option<&Binding> {
        self.bindings().iter().find(|b| b.kind == BindingKind::Output)
    }

    /// Runs one synchronous inference pass.
    ///
    /// `input` must hold exactly the input binding's element count and
    /// `output` exactly the output binding's element count, both as
    /// flat `f32` buffers.
    fn execute(&self, input: &[f32], output: &mut [f32]) -> Result<(), EngineError>;
}

/// A compiled engine backed by a tract execution plan.
pub struct TractEngine {
    plan: TypedSimplePlan<TypedModel>,
    bindings: Vec<Binding>,
}

impl TractEngine {
    fn input(&self) -> &Binding {
        // Constructed with exactly one input; see `EngineLoader::deserialize`.
        self.bindings
            .iter()
            .find(|b| b.kind == BindingKind::Input)
            .expect("engine constructed without input binding")
    }

    fn output(&self) -> &Binding {
        self.bindings
            .iter()
            .find(|b| b.kind == BindingKind::Output)
            .expect("engine constructed without output binding")
    }
}

impl Engine for TractEngine {
    fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    fn execute(&self, input: &[f32], output: &mut [f32]) -> Result<(), EngineError> {
        let in_binding = self.input();
        if input.len() != in_binding.num_elements() {
            return Err(EngineError::BindingSizeMismatch {
                binding: in_binding.name.clone(),
                expected: in_binding.num_elements(),
                actual: input.len(),
            });
        }

        let dims = in_binding.shape.dims().to_vec();
        let array =
            tract_ndarray::ArrayD::from_shape_vec(tract_ndarray::IxDyn(&dims), input.to_vec())
                .map_err(|e| EngineError::ExecutionFailed(e.to_string()))?;
        let tensor: Tensor = array.into();

        let results = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| EngineError::ExecutionFailed(e.to_string()))?;

        let view = results[0]
            .to_array_view::<f32>()
            .map_err(|e| EngineError::ExecutionFailed(e.to_string()))?;

        let out_binding = self.output();
        if view.len() != output.len() {
            return Err(EngineError::BindingSizeMismatch {
                binding: out_binding.name.clone(),
                expected: output.len(),
                actual: view.len(),
            });
        }
        for (dst, src) in output.iter_mut().zip(view.iter()) {
            *dst = *src;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TractEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TractEngine")
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Loads serialized engine artifacts into executable [`TractEngine`]s.
pub struct EngineLoader;

impl EngineLoader {
    /// Reads the entire artifact file and deserializes it.
    ///
    /// `input_dims` is the host-side image shape (`[C, H, W]`); the
    /// engine's input binding is pinned to `[1, C, H, W]` f32 before the
    /// factory optimizes the graph.
    pub fn load(path: &Path, input_dims: &Shape) -> Result<TractEngine, EngineError> {
        let bytes = std::fs::read(path).map_err(|source| EngineError::ArtifactRead {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(
            "engine artifact: {} ({:.2} MB)",
            path.display(),
            bytes.len() as f64 / (1024.0 * 1024.0),
        );
        Self::deserialize(&bytes, input_dims)
    }

    /// Deserializes artifact bytes through the engine factory.
    pub fn deserialize(bytes: &[u8], input_dims: &Shape) -> Result<TractEngine, EngineError> {
        let dims = input_dims.dims();
        if dims.len() != 3 {
            return Err(EngineError::UnsupportedModel(format!(
                "input dims must be [C, H, W], got {input_dims}"
            )));
        }
        let (c, h, w) = (dims[0], dims[1], dims[2]);

        let mut cursor = std::io::Cursor::new(bytes);
        let model = tract_onnx::onnx()
            .model_for_read(&mut cursor)
            .map_err(|e| EngineError::DeserializeFailed(e.to_string()))?
            .with_input_fact(0, f32::fact([1, c, h, w]).into())
            .map_err(|e| EngineError::DeserializeFailed(e.to_string()))?;

        let typed = model
            .into_optimized()
            .map_err(|e| EngineError::DeserializeFailed(e.to_string()))?;

        let bindings = Self::resolve_bindings(&typed)?;
        for b in &bindings {
            tracing::debug!("engine binding: {b}");
        }

        let plan = typed
            .into_runnable()
            .map_err(|e| EngineError::DeserializeFailed(e.to_string()))?;

        Ok(TractEngine { plan, bindings })
    }

    /// Extracts named I/O bindings from the optimized model.
    ///
    /// A classification engine must expose exactly one f32 input and one
    /// f32 output, both with fully concrete shapes.
    fn resolve_bindings(model: &TypedModel) -> Result<Vec<Binding>, EngineError> {
        if model.inputs.len() != 1 || model.outputs.len() != 1 {
            return Err(EngineError::UnsupportedModel(format!(
                "expected a single input and a single output binding, found {} inputs / {} outputs",
                model.inputs.len(),
                model.outputs.len(),
            )));
        }

        let mut bindings = Vec::with_capacity(2);
        for (outlet, kind) in [
            (model.inputs[0], BindingKind::Input),
            (model.outputs[0], BindingKind::Output),
        ] {
            let name = model.node(outlet.node).name.clone();
            let fact = model
                .outlet_fact(outlet)
                .map_err(|e| EngineError::UnsupportedModel(e.to_string()))?;

            if fact.datum_type != f32::datum_type() {
                return Err(EngineError::UnsupportedModel(format!(
                    "{} binding '{}' has dtype {:?}, expected f32",
                    kind.as_str(),
                    name,
                    fact.datum_type,
                )));
            }

            let dims = fact.shape.as_concrete().ok_or_else(|| {
                EngineError::UnsupportedModel(format!(
                    "{} binding '{}' has symbolic dimensions",
                    kind.as_str(),
                    name,
                ))
            })?;

            bindings.push(Binding {
                name,
                kind,
                shape: Shape::new(dims.to_vec()),
                dtype: DType::F32,
            });
        }

        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let result = EngineLoader::load(
            Path::new("/nonexistent/resnet50_fp32.onnx"),
            &Shape::chw(3, 224, 224),
        );
        assert!(matches!(result, Err(EngineError::ArtifactRead { .. })));
    }

    #[test]
    fn test_deserialize_garbage() {
        let bytes = vec![0xDEu8, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03];
        let result = EngineLoader::deserialize(&bytes, &Shape::chw(3, 224, 224));
        assert!(matches!(result, Err(EngineError::DeserializeFailed(_))));
    }

    #[test]
    fn test_deserialize_rejects_bad_dims() {
        let result = EngineLoader::deserialize(&[], &Shape::vector(1000));
        assert!(matches!(result, Err(EngineError::UnsupportedModel(_))));
    }
}
