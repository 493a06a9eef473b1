//! Reconstruct command implementation.
//!
//! The reconstruct command:
//! 1. Reads each log file line by line
//! 2. Rebuilds traces from profiling lines
//! 3. Renders all completed traces in the requested format

use super::models::ReconstructArgs;
use crate::input::LogSource;
use crate::output::{open_sink, renderer_for};
use crate::trace::{LogReconstructor, TraceTree};
use crate::utils::config::MAX_TOP_OPERATIONS;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Execute the reconstruct command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Missing or unreadable input files
/// * Malformed profiling lines
/// * Output write errors
pub fn execute_reconstruct(args: ReconstructArgs) -> Result<()> {
    let start_time = Instant::now();

    let mut traces = Vec::new();
    for path in &args.inputs {
        let file_traces =
            reconstruct_file(path).with_context(|| format!("Failed to process {}", path.display()))?;
        traces.extend(file_traces);
    }

    info!("Reconstructed {} traces from {} files", traces.len(), args.inputs.len());

    let renderer = renderer_for(&args.render_config());
    let mut sink = open_sink(args.output.as_deref()).context("Failed to open output")?;
    renderer
        .render(&traces, sink.as_mut())
        .context("Failed to render traces")?;

    if let Some(path) = &args.output {
        info!("✓ Output written to: {}", path.display());
    }

    debug!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Rebuild all traces completed within one log file
///
/// **Public** - each file gets its own reconstructor, so a profile left open
/// at the end of one file never absorbs records from the next
pub fn reconstruct_file(path: &Path) -> Result<Vec<TraceTree>> {
    info!("Reading {}", path.display());

    let mut source = LogSource::open(path)?;
    let mut reconstructor = LogReconstructor::new();

    while let Some(line) = source.next_line()? {
        reconstructor
            .process(&line)
            .with_context(|| format!("{}:{}", path.display(), source.line_number()))?;
    }

    let stats = reconstructor.stats();
    debug!(
        "{}: {} lines, {} unparseable, {} profiling records, {} traces",
        path.display(),
        stats.lines,
        stats.unparseable_lines,
        stats.records,
        stats.traces
    );

    Ok(reconstructor.finish())
}

/// Validate reconstruct arguments
///
/// **Public** - can be called before execute_reconstruct for early validation
pub fn validate_args(args: &ReconstructArgs) -> Result<()> {
    if args.inputs.is_empty() {
        anyhow::bail!("At least one log file is required");
    }

    let missing: Vec<String> = args
        .inputs
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Input files not found: {}", missing.join(", "));
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > MAX_TOP_OPERATIONS {
        anyhow::bail!("top is too large (max {})", MAX_TOP_OPERATIONS);
    }

    Ok(())
}
