// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The execution layer that drives a loaded engine over device memory.
//!
//! The runner takes:
//! - An [`Engine`](engine_loader::Engine) handle from `engine-loader`.
//! - A [`DevicePool`](device_memory::DevicePool) from `device-memory`.
//! - A preprocessed input tensor from `vision`.
//!
//! And performs the single-image benchmark choreography: stage the input
//! in device memory, invoke the engine synchronously a configured number
//! of times while timing each call, then copy the score vector back.
//!
//! # Type-State Pipeline
//! The runner enforces a type-safe pipeline:
//! ```text
//! InferenceRunner<Idle> → InferenceRunner<Loaded> → InferenceRunner<Ready>
//! ```
//! Transitions are compile-time checked, so the device buffers cannot be
//! touched before the engine's binding metadata has sized them.
//!
//! Everything here is synchronous and single-threaded: the engine call
//! blocks until the scores are ready, and runs never overlap.

mod config;
mod error;
mod metrics;
mod runner;

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use metrics::{InferenceMetrics, IterationTiming};
pub use runner::{Idle, InferenceRunner, Loaded, Ready, RunOutput, RunnerState};
