// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # engine-loader
//!
//! Loads a pre-compiled classification engine from a serialized artifact
//! and exposes it behind the opaque [`Engine`] execution seam.
//!
//! This crate provides:
//! - [`Precision`] — the numeric mode an artifact was compiled with
//!   (int8, fp16, fp32) and the per-precision default artifact paths.
//! - [`Binding`] — I/O tensor metadata reported by the deserialized
//!   engine. Bindings are looked up by name, never by positional index.
//! - [`Engine`] — the synchronous, black-box execute capability. The
//!   runner holds a `Box<dyn Engine>`, so tests can substitute a stub.
//! - [`EngineLoader`] — reads the entire artifact file into memory and
//!   deserializes it through the runtime's engine factory into a ready-to-
//!   execute [`TractEngine`].
//!
//! Engine construction, quantization, and calibration happen in an offline
//! compilation step elsewhere; this crate only consumes the result.

mod binding;
mod engine;
mod error;
mod precision;

pub use binding::{Binding, BindingKind};
pub use engine::{Engine, EngineLoader, TractEngine};
pub use error::EngineError;
pub use precision::Precision;
