//! Collapsed stack output for flamegraph tools.
//!
//! Each line is `frame;frame;frame <exclusive ms>`, ready for
//! `inferno-flamegraph` or `flamegraph.pl`.

use super::Renderer;
use crate::aggregator::build_collapsed_stacks;
use crate::trace::TraceTree;
use crate::utils::error::OutputError;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct FlamegraphRenderer;

impl Renderer for FlamegraphRenderer {
    fn render(&self, traces: &[TraceTree], out: &mut dyn Write) -> Result<(), OutputError> {
        for stack in build_collapsed_stacks(traces) {
            writeln!(out, "{}", stack.to_line())?;
        }

        out.flush()?;
        Ok(())
    }
}
