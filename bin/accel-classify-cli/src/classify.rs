// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The benchmark flow behind the `accel-classify` command.
//!
//! Strictly linear: load labels → preprocess image → load engine →
//! stage device buffers → execute ×N → download → report. Every failure
//! is a typed error propagated straight to `main`, which exits non-zero.

use runtime::{InferenceRunner, RuntimeConfig};
use vision::{preprocess, rank, ImageDims, LabelStore};

/// Initialises the tracing subscriber from the `-v` count.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Runs the full benchmark for the given configuration.
pub fn execute(config: RuntimeConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║         accel-classify · Engine Benchmark           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    println!("  Config:");
    println!("   Engine:     {}", config.resolve_engine_path().display());
    println!("   Precision:  {}", config.precision);
    println!("   Image:      {}", config.image_path.display());
    println!("   Labels:     {}", config.labels_path.display());
    println!("   Iterations: {}", config.iterations);
    println!("   Device mem: {}", config.device_memory);
    println!();

    // ── Labels ─────────────────────────────────────────────────
    // Loaded once; both the ranking and the argmax below read this store.
    println!("  [1/4] Loading class labels...");
    let labels = LabelStore::from_file(&config.labels_path)?;
    println!("        {} classes", labels.len());
    println!();

    // ── Preprocess ─────────────────────────────────────────────
    println!("  [2/4] Preprocessing image...");
    let dims = ImageDims {
        channels: config.input_dims[0],
        height: config.input_dims[1],
        width: config.input_dims[2],
    };
    let input = preprocess(&config.image_path, &dims)?;
    tracing::debug!("preprocessed {} into {}", config.image_path.display(), input.shape());
    println!("        Input tensor: {}", input.shape());
    println!();

    // ── Engine + device buffers ────────────────────────────────
    println!("  [3/4] Loading engine and staging device buffers...");
    let top_n = config.top_n;
    let mut runner = InferenceRunner::new(config).load_engine()?.prepare()?;
    println!("        Ready.");
    println!();

    // ── Run ────────────────────────────────────────────────────
    println!("  [4/4] Running inference...");
    let output = runner.run(&input)?;
    for t in &output.metrics.iterations {
        println!("        iteration {}: {:.3} ms", t.iteration, t.as_ms());
    }
    println!("        {}", output.metrics.summary());
    println!();

    // ── Report ─────────────────────────────────────────────────
    let report = rank(&output.scores, &labels, top_n)?;

    println!("  Top {} categories:", report.top.len());
    for entry in &report.top {
        println!(
            "   {:>4}  {:<40} {:.6}",
            entry.index,
            truncate(&entry.label, 40),
            entry.score,
        );
    }
    println!();
    println!(
        "  Best: {} (class {}, score {:.6})",
        report.best.label, report.best.index, report.best.score,
    );
    println!();

    println!("  {}", runner.device_stats().summary());
    println!();

    Ok(())
}

/// Truncates a string with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
