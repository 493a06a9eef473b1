//! Renderers for finalized traces.
//!
//! This module handles writing traces in the supported formats:
//! - CSV rows, one per span
//! - Collapsed flamegraph stacks
//! - Zipkin v2 JSON (ListOfSpans)
//! - Human-readable trace listings and summary tables

pub mod csv;
pub mod flamegraph;
pub mod human;
pub mod zipkin;

// Re-export main types
pub use self::csv::CsvRenderer;
pub use flamegraph::FlamegraphRenderer;
pub use human::HumanRenderer;
pub use zipkin::ZipkinRenderer;

use crate::trace::TraceTree;
use crate::utils::config::DEFAULT_TOP_OPERATIONS;
use crate::utils::error::OutputError;
use clap::ValueEnum;
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Csv,
    Flamegraph,
    Zipkin,
}

/// Consumer of finalized traces
///
/// Traces arrive in completion order; renderers walk each one depth-first.
pub trait Renderer {
    fn render(&self, traces: &[TraceTree], out: &mut dyn Write) -> Result<(), OutputError>;
}

/// Rendering options, resolved once by the CLI
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: OutputFormat,

    /// Emit ANSI colors (human format only)
    pub color: bool,

    /// Rows per summary table (human format only)
    pub top: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: false,
            top: DEFAULT_TOP_OPERATIONS,
        }
    }
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }
}

/// Pick the renderer for a configuration
pub fn renderer_for(config: &RenderConfig) -> Box<dyn Renderer> {
    match config.format {
        OutputFormat::Human => Box::new(HumanRenderer::new(config.color, config.top)),
        OutputFormat::Csv => Box::new(CsvRenderer),
        OutputFormat::Flamegraph => Box::new(FlamegraphRenderer),
        OutputFormat::Zipkin => Box::new(ZipkinRenderer::default()),
    }
}

/// Render traces into an in-memory string
///
/// **Public** - for library users that embed a report (e.g. in a larger
/// message or a web response) instead of writing it to a sink
///
/// # Errors
/// * `OutputError` - the renderer failed; writing to memory itself cannot fail
pub fn render_to_string(renderer: &dyn Renderer, traces: &[TraceTree]) -> Result<String, OutputError> {
    let mut buf = Vec::new();
    renderer.render(traces, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Open the output sink: a file when a path is given, stdout otherwise
///
/// Parent directories of the file are created as needed.
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - The file cannot be created
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>, OutputError> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };

    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
