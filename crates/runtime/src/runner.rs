// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The core inference runner with type-state–enforced pipeline.
//!
//! ```text
//! InferenceRunner<Idle>
//!     │  .load_engine()
//!     ▼
//! InferenceRunner<Loaded>
//!     │  .prepare()
//!     ▼
//! InferenceRunner<Ready>
//!     │  .run()
//!     ▼
//!   RunOutput
//! ```
//!
//! Each state transition consumes the old value and returns a new one,
//! making invalid sequences a compile error: device buffers cannot exist
//! before the engine's binding metadata has sized them, and nothing can
//! execute before both are in place.

use crate::{InferenceMetrics, RuntimeConfig, RuntimeError};
use device_memory::{DeviceBuffer, DevicePool, DeviceStats};
use engine_loader::{Engine, EngineError, EngineLoader};
use std::time::Instant;
use tensor_core::Tensor;

// ── Type-state markers ─────────────────────────────────────────

/// Runner is created but no engine is loaded.
#[derive(Debug)]
pub struct Idle;

/// Engine is deserialized and its bindings are validated.
#[derive(Debug)]
pub struct Loaded;

/// Device buffers are allocated; the runner can execute.
#[derive(Debug)]
pub struct Ready;

/// Sealed trait for runner states.
pub trait RunnerState: std::fmt::Debug {}
impl RunnerState for Idle {}
impl RunnerState for Loaded {}
impl RunnerState for Ready {}

// ── Run output ─────────────────────────────────────────────────

/// The result of a benchmark run.
#[derive(Debug)]
pub struct RunOutput {
    /// The score vector downloaded from device memory, one f32 per class.
    pub scores: Vec<f32>,
    /// Transfer and per-iteration timing metrics.
    pub metrics: InferenceMetrics,
}

// ── Runner ─────────────────────────────────────────────────────

/// The primary inference runner.
///
/// `S` is a type-state marker that enforces the pipeline ordering at
/// compile time. You cannot call `.run()` on an `Idle` runner or
/// `.load_engine()` on a `Ready` runner — the compiler catches it.
///
/// # Example
/// ```no_run
/// use runtime::{InferenceRunner, RuntimeConfig};
/// use tensor_core::{DType, Shape, Tensor};
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let mut runner = InferenceRunner::new(RuntimeConfig::default())
///     .load_engine()?
///     .prepare()?;
/// let input = Tensor::zeros(Shape::chw(3, 224, 224), DType::F32);
/// let output = runner.run(&input)?;
/// println!("{}", output.metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct InferenceRunner<S: RunnerState = Idle> {
    config: RuntimeConfig,
    _state: std::marker::PhantomData<S>,
    // Fields populated as the runner transitions through states:
    engine: Option<Box<dyn Engine>>,
    pool: Option<DevicePool>,
    input_buffer: Option<DeviceBuffer>,
    output_buffer: Option<DeviceBuffer>,
}

// ── Idle → Loaded ──────────────────────────────────────────────

impl InferenceRunner<Idle> {
    /// Creates a new runner from the given configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        tracing::info!("runner created, precision '{}'", config.precision);
        Self {
            config,
            _state: std::marker::PhantomData,
            engine: None,
            pool: None,
            input_buffer: None,
            output_buffer: None,
        }
    }

    /// Reads and deserializes the engine artifact, then validates its
    /// bindings. Transitions to the `Loaded` state.
    pub fn load_engine(self) -> Result<InferenceRunner<Loaded>, RuntimeError> {
        self.config.validate()?;
        let path = self.config.resolve_engine_path();
        tracing::info!("loading engine from {}", path.display());

        let engine = EngineLoader::load(&path, &self.config.input_shape())?;
        Self::with_engine(self.config, Box::new(engine))
    }

    /// Builds a `Loaded` runner around a pre-built engine handle.
    ///
    /// This is the injection seam the integration tests use; the engine's
    /// bindings are validated against the configuration exactly as in
    /// [`load_engine`](Self::load_engine).
    pub fn with_engine(
        config: RuntimeConfig,
        engine: Box<dyn Engine>,
    ) -> Result<InferenceRunner<Loaded>, RuntimeError> {
        config.validate()?;

        let input = engine.input_binding().ok_or_else(|| {
            RuntimeError::Engine(EngineError::BindingNotFound {
                name: "input".into(),
            })
        })?;
        if !input.shape.matches_unbatched(&config.input_shape()) {
            return Err(RuntimeError::InputShapeMismatch {
                expected: input.shape.clone(),
                actual: config.input_shape(),
            });
        }

        let output = engine.output_binding().ok_or_else(|| {
            RuntimeError::Engine(EngineError::BindingNotFound {
                name: "output".into(),
            })
        })?;
        if output.num_elements() != config.num_classes {
            return Err(RuntimeError::OutputSizeMismatch {
                expected: config.num_classes,
                actual: output.num_elements(),
            });
        }

        for b in engine.bindings() {
            tracing::info!("binding: {b}");
        }

        Ok(InferenceRunner {
            config,
            _state: std::marker::PhantomData,
            engine: Some(engine),
            pool: None,
            input_buffer: None,
            output_buffer: None,
        })
    }
}

// ── Loaded → Ready ─────────────────────────────────────────────

impl InferenceRunner<Loaded> {
    /// Returns the loaded engine.
    pub fn engine(&self) -> &dyn Engine {
        self.engine
            .as_deref()
            .expect("engine must exist in Loaded state")
    }

    /// Creates the device pool and allocates the two device buffers
    /// (input tensor, score vector), sized from the engine's binding
    /// metadata. Transitions to the `Ready` state.
    pub fn prepare(self) -> Result<InferenceRunner<Ready>, RuntimeError> {
        let budget = self.config.parse_device_budget()?;
        let pool = DevicePool::new(budget);
        tracing::info!("device pool created: {budget} capacity");

        let (input_bytes, output_bytes) = {
            let engine = self
                .engine
                .as_deref()
                .expect("engine must exist in Loaded state");
            let input = engine
                .input_binding()
                .expect("bindings validated in Loaded state");
            let output = engine
                .output_binding()
                .expect("bindings validated in Loaded state");
            (input.size_bytes(), output.size_bytes())
        };

        let input_buffer = pool
            .allocate(input_bytes)
            .map_err(RuntimeError::DeviceAllocationFailed)?;
        let output_buffer = pool
            .allocate(output_bytes)
            .map_err(RuntimeError::DeviceAllocationFailed)?;

        tracing::debug!(
            "device buffers staged: input {} bytes, output {} bytes, {} free",
            input_bytes,
            output_bytes,
            pool.available_bytes(),
        );

        Ok(InferenceRunner {
            config: self.config,
            _state: std::marker::PhantomData,
            engine: self.engine,
            pool: Some(pool),
            input_buffer: Some(input_buffer),
            output_buffer: Some(output_buffer),
        })
    }
}

// ── Ready: run inference ───────────────────────────────────────

impl InferenceRunner<Ready> {
    /// Returns a snapshot of the device pool's statistics.
    pub fn device_stats(&self) -> DeviceStats {
        self.pool
            .as_ref()
            .expect("pool exists in Ready state")
            .stats()
    }

    /// Runs the benchmark: upload → execute ×N → download.
    ///
    /// The engine is invoked synchronously `config.iterations` times
    /// against the same staged input; each call's wall-clock duration is
    /// recorded in the returned metrics as plain elapsed time. The score
    /// vector is downloaded once, after the final iteration.
    pub fn run(&mut self, input: &Tensor) -> Result<RunOutput, RuntimeError> {
        let run_start = Instant::now();

        let engine = self
            .engine
            .as_deref()
            .expect("engine exists in Ready state");
        let input_buffer = self
            .input_buffer
            .as_mut()
            .expect("input buffer exists in Ready state");
        let output_buffer = self
            .output_buffer
            .as_mut()
            .expect("output buffer exists in Ready state");

        let binding_shape = &engine
            .input_binding()
            .expect("bindings validated in Loaded state")
            .shape;
        if !binding_shape.matches_unbatched(input.shape()) {
            return Err(RuntimeError::InputShapeMismatch {
                expected: binding_shape.clone(),
                actual: input.shape().clone(),
            });
        }

        let mut metrics = InferenceMetrics::new(self.config.iterations);

        // Host → device.
        let upload_start = Instant::now();
        input_buffer
            .upload_f32(input.as_f32_slice())
            .map_err(RuntimeError::TransferFailed)?;
        metrics.record_upload(upload_start.elapsed(), input.size_bytes());

        // Synchronous execute loop. Each call blocks until the scores in
        // device memory are valid.
        for iteration in 0..self.config.iterations {
            let start = Instant::now();
            engine
                .execute(input_buffer.as_f32_slice(), output_buffer.as_f32_slice_mut())
                .map_err(|source| RuntimeError::ExecutionFailed { iteration, source })?;
            let elapsed = start.elapsed();
            tracing::info!(
                "iteration {iteration}: {:.3} ms",
                elapsed.as_secs_f64() * 1000.0,
            );
            metrics.record_iteration(iteration, elapsed);
        }

        // Device → host.
        let download_start = Instant::now();
        let scores = output_buffer
            .download_f32()
            .map_err(RuntimeError::TransferFailed)?;
        metrics.record_download(download_start.elapsed(), scores.len() * 4);

        metrics.finalise(run_start.elapsed());
        tracing::info!("{}", metrics.summary());

        Ok(RunOutput { scores, metrics })
    }
}

impl<S: RunnerState> std::fmt::Debug for InferenceRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceRunner")
            .field("state", &std::any::type_name::<S>())
            .field("precision", &self.config.precision)
            .field("has_engine", &self.engine.is_some())
            .field("has_pool", &self.pool.is_some())
            .field(
                "buffers_staged",
                &(self.input_buffer.is_some() && self.output_buffer.is_some()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_loader::{Binding, BindingKind};
    use tensor_core::{DType, Shape};

    /// An engine stub that returns a canned score vector.
    struct FixtureEngine {
        bindings: Vec<Binding>,
        scores: Vec<f32>,
    }

    impl FixtureEngine {
        fn new(input_dims: &[usize], scores: Vec<f32>) -> Self {
            let bindings = vec![
                Binding {
                    name: "data".into(),
                    kind: BindingKind::Input,
                    shape: Shape::new(input_dims.to_vec()).batched(),
                    dtype: DType::F32,
                },
                Binding {
                    name: "scores".into(),
                    kind: BindingKind::Output,
                    shape: Shape::new(vec![1, scores.len()]),
                    dtype: DType::F32,
                },
            ];
            Self { bindings, scores }
        }
    }

    impl Engine for FixtureEngine {
        fn bindings(&self) -> &[Binding] {
            &self.bindings
        }

        fn execute(&self, _input: &[f32], output: &mut [f32]) -> Result<(), EngineError> {
            if output.len() != self.scores.len() {
                return Err(EngineError::BindingSizeMismatch {
                    binding: "scores".into(),
                    expected: self.scores.len(),
                    actual: output.len(),
                });
            }
            output.copy_from_slice(&self.scores);
            Ok(())
        }
    }

    fn small_config() -> RuntimeConfig {
        RuntimeConfig {
            input_dims: vec![3, 4, 4],
            num_classes: 10,
            iterations: 5,
            device_memory: "1M".into(),
            ..Default::default()
        }
    }

    fn fixture_scores() -> Vec<f32> {
        (0..10).map(|i| (i as f32) / 10.0).collect()
    }

    #[test]
    fn test_full_pipeline() {
        let config = small_config();
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());

        let mut runner = InferenceRunner::with_engine(config, Box::new(engine))
            .unwrap()
            .prepare()
            .unwrap();

        let input = Tensor::zeros(Shape::chw(3, 4, 4), DType::F32);
        let output = runner.run(&input).unwrap();

        assert_eq!(output.scores, fixture_scores());
        assert_eq!(output.metrics.iterations.len(), 5);
        assert_eq!(output.metrics.bytes_uploaded, 3 * 4 * 4 * 4);
        assert_eq!(output.metrics.bytes_downloaded, 10 * 4);
        assert!(output.metrics.total_duration.as_nanos() > 0);
    }

    #[test]
    fn test_exactly_two_device_buffers() {
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let mut runner = InferenceRunner::with_engine(small_config(), Box::new(engine))
            .unwrap()
            .prepare()
            .unwrap();

        let input = Tensor::zeros(Shape::chw(3, 4, 4), DType::F32);
        let _ = runner.run(&input).unwrap();

        let stats = runner.device_stats();
        assert_eq!(stats.total_allocations, 2);
        assert_eq!(stats.total_releases, 0); // Buffers live until the runner drops.
        assert_eq!(stats.uploads, 1);
        assert_eq!(stats.downloads, 1);
    }

    #[test]
    fn test_bindings_resolved_by_name() {
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let runner = InferenceRunner::with_engine(small_config(), Box::new(engine)).unwrap();

        let e = runner.engine();
        assert!(e.binding("data").is_some());
        assert!(e.binding("scores").is_some());
        assert!(e.binding("bogus").is_none());
        assert_eq!(e.input_binding().unwrap().name, "data");
        assert_eq!(e.output_binding().unwrap().name, "scores");
    }

    #[test]
    fn test_input_shape_mismatch_at_load() {
        let engine = FixtureEngine::new(&[3, 8, 8], fixture_scores());
        let result = InferenceRunner::with_engine(small_config(), Box::new(engine));
        assert!(matches!(
            result,
            Err(RuntimeError::InputShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_output_size_mismatch_at_load() {
        let engine = FixtureEngine::new(&[3, 4, 4], vec![0.0; 7]);
        let result = InferenceRunner::with_engine(small_config(), Box::new(engine));
        assert!(matches!(
            result,
            Err(RuntimeError::OutputSizeMismatch {
                expected: 10,
                actual: 7,
            })
        ));
    }

    #[test]
    fn test_input_shape_mismatch_at_run() {
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let mut runner = InferenceRunner::with_engine(small_config(), Box::new(engine))
            .unwrap()
            .prepare()
            .unwrap();

        let wrong = Tensor::zeros(Shape::chw(3, 2, 2), DType::F32);
        assert!(matches!(
            runner.run(&wrong),
            Err(RuntimeError::InputShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_device_allocation_failure() {
        // 256 bytes of device memory: the input extent fits exactly, the
        // score buffer no longer does.
        let config = RuntimeConfig {
            device_memory: "256".into(),
            ..small_config()
        };
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let result = InferenceRunner::with_engine(config, Box::new(engine))
            .unwrap()
            .prepare();
        assert!(matches!(
            result,
            Err(RuntimeError::DeviceAllocationFailed(_))
        ));
    }

    #[test]
    fn test_iteration_count_follows_config() {
        let config = RuntimeConfig {
            iterations: 3,
            ..small_config()
        };
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let mut runner = InferenceRunner::with_engine(config, Box::new(engine))
            .unwrap()
            .prepare()
            .unwrap();

        let input = Tensor::zeros(Shape::chw(3, 4, 4), DType::F32);
        let output = runner.run(&input).unwrap();
        assert_eq!(output.metrics.iterations.len(), 3);
        for (i, t) in output.metrics.iterations.iter().enumerate() {
            assert_eq!(t.iteration, i);
        }
    }

    #[test]
    fn test_repeated_runs_reuse_buffers() {
        let engine = FixtureEngine::new(&[3, 4, 4], fixture_scores());
        let mut runner = InferenceRunner::with_engine(small_config(), Box::new(engine))
            .unwrap()
            .prepare()
            .unwrap();

        let input = Tensor::zeros(Shape::chw(3, 4, 4), DType::F32);
        for _ in 0..3 {
            let output = runner.run(&input).unwrap();
            assert_eq!(output.scores.len(), 10);
        }

        let stats = runner.device_stats();
        assert_eq!(stats.total_allocations, 2); // Still just the two buffers.
        assert_eq!(stats.uploads, 3);
        assert_eq!(stats.downloads, 3);
    }

    #[test]
    fn test_debug_format() {
        let runner = InferenceRunner::new(RuntimeConfig::default());
        let debug = format!("{runner:?}");
        assert!(debug.contains("InferenceRunner"));
        assert!(debug.contains("has_engine"));
    }
}
