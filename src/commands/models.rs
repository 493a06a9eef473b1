use crate::output::{OutputFormat, RenderConfig};
use crate::utils::config::DEFAULT_TOP_OPERATIONS;
use std::path::PathBuf;

/// Arguments for the reconstruct command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReconstructArgs {
    /// Log files to read, in order (`.gz` files are decompressed)
    pub inputs: Vec<PathBuf>,

    /// Output format
    pub format: OutputFormat,

    /// Colorize human output; resolved by the caller
    pub color: bool,

    /// Output file (stdout when absent)
    pub output: Option<PathBuf>,

    /// Rows per summary table in human output
    pub top: usize,
}

impl Default for ReconstructArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            format: OutputFormat::Human,
            color: false,
            output: None,
            top: DEFAULT_TOP_OPERATIONS,
        }
    }
}

impl ReconstructArgs {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::new(self.format)
            .with_color(self.color)
            .with_top(self.top)
    }
}
