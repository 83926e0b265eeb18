// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # accel-classify
//!
//! Command-line interface for the single-image classification benchmark.
//!
//! ## Usage
//! ```bash
//! # FP32 engine (the default), sample image
//! accel-classify
//!
//! # INT8 engine, custom image
//! accel-classify --int8 --image ./photos/binoculars.jpeg
//!
//! # Explicit artifact, more ranked labels
//! accel-classify --engine ./models/resnet50_fp16.onnx --top-n 15
//! ```

mod classify;

use clap::Parser;
use engine_loader::Precision;
use runtime::RuntimeConfig;

#[derive(Parser)]
#[command(
    name = "accel-classify",
    about = "ResNet-50 single-image classification benchmark on a pre-compiled engine",
    version,
    author
)]
struct Cli {
    /// Select the INT8 engine artifact default.
    #[arg(short = '8', long = "int8")]
    int8: bool,

    /// Select the FP16 engine artifact default (mutually exclusive with --int8).
    #[arg(long = "fp16", alias = "16")]
    fp16: bool,

    /// Explicit FP32 (the default behaviour when no precision flag is given).
    #[arg(long = "fp32", alias = "32")]
    fp32: bool,

    /// Path to the engine artifact (overrides the precision default).
    #[arg(short, long)]
    engine: Option<std::path::PathBuf>,

    /// Path to the input image.
    #[arg(short, long)]
    image: Option<std::path::PathBuf>,

    /// Path to the class-label file.
    #[arg(short, long)]
    labels: Option<std::path::PathBuf>,

    /// Number of ranked labels to print.
    #[arg(short = 'n', long = "top-n", default_value_t = 10)]
    top_n: usize,

    /// Number of timed execute calls.
    #[arg(long)]
    iterations: Option<usize>,

    /// Path to a TOML configuration file (CLI flags override it).
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    classify::init_tracing(cli.verbose);

    // Conflicting precision flags are rejected before any file is touched,
    // including the --config file.
    if cli.int8 && cli.fp16 {
        anyhow::bail!("cannot use both INT8 and FP16 precision at the same time");
    }

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };

    if cli.int8 {
        config.precision = Precision::Int8;
    } else if cli.fp16 {
        config.precision = Precision::Fp16;
    } else if cli.fp32 {
        config.precision = Precision::Fp32;
    }

    if let Some(engine) = cli.engine {
        config.engine_path = Some(engine);
    }
    if let Some(image) = cli.image {
        config.image_path = image;
    }
    if let Some(labels) = cli.labels {
        config.labels_path = labels;
    }
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    config.top_n = cli.top_n;

    config.validate()?;

    classify::execute(config)
}
