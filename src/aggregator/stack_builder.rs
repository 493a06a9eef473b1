//! Build collapsed stack format from finalized traces.
//!
//! Collapsed stacks are the input format for flamegraph tools.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "GET /puppet/v3/catalog;compile;lookup 12"
//! This means: the request called compile which called lookup, spending
//! 12 ms in lookup itself.

use crate::trace::TraceTree;
use log::debug;

/// A single collapsed stack entry
///
/// **Public** - used by the flamegraph renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (exclusive milliseconds of the innermost frame)
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as a collapsed-stack line
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build one collapsed stack per span with non-zero exclusive time
///
/// **Public** - main entry point for stack building
///
/// Stacks are emitted per span, in trace order and then depth-first order;
/// identical stacks are not merged, flamegraph tools sum them.
pub fn build_collapsed_stacks(traces: &[TraceTree]) -> Vec<CollapsedStack> {
    let stacks: Vec<CollapsedStack> = traces
        .iter()
        .flat_map(|trace| trace.iter())
        .filter_map(|(_, node)| {
            let weight = node.exclusive_ms.unwrap_or(0);
            if weight == 0 {
                return None;
            }

            let frames: Vec<String> = node.operation_stack.iter().map(|name| sanitize_frame(name)).collect();
            Some(CollapsedStack::new(frames.join(";"), weight))
        })
        .collect();

    debug!("Built {} collapsed stacks from {} traces", stacks.len(), traces.len());

    stacks
}

/// Make a name safe to use as a single frame
///
/// Semicolons separate frames and the last space separates the weight, so
/// semicolons become colons. Line breaks are flattened to spaces.
pub fn sanitize_frame(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ';' => ':',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}
