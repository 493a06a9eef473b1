//! One-shot timing pass over a completed trace.
//!
//! Post-order: a node's exclusive time needs the inclusive times of all of
//! its children first.

use super::record::SpanPath;
use super::tree::{TraceNode, TraceTree};
use log::debug;

/// Compute durations, operation stacks and parent linkage for every node
///
/// **Public** - called by the assembler once all records of a trace are inserted
///
/// A tree is finalized at most once; calling this again is a no-op and
/// leaves every value as computed by the first call.
pub fn finalize(tree: &mut TraceTree) {
    if tree.finalized {
        debug!("Trace {} already finalized, skipping", tree.trace_id);
        return;
    }

    finalize_node(&mut tree.root, &tree.trace_id, None, &[]);
    tree.finalized = true;

    debug!(
        "Finalized trace {} ({} ms)",
        tree.trace_id,
        tree.root.inclusive_ms.unwrap_or(0)
    );
}

/// Returns the node's inclusive time in milliseconds
fn finalize_node(
    node: &mut TraceNode,
    trace_id: &str,
    parent: Option<&SpanPath>,
    parent_stack: &[String],
) -> u64 {
    let mut stack = parent_stack.to_vec();
    stack.push(node.name().to_string());

    let path = &node.path;
    let children_ms: u64 = node
        .children
        .values_mut()
        .map(|child| finalize_node(child, trace_id, Some(path), &stack))
        .fold(0, u64::saturating_add);

    // Truncates toward zero, like an integer coercion of the logged seconds.
    // A placeholder never had its own timing and spans exactly its children.
    let inclusive_ms = node
        .record
        .as_ref()
        .map_or(children_ms, |r| (r.duration_seconds * 1000.0) as u64);

    // Children can outlast their parent through logging noise; clamp at zero
    let exclusive_ms = inclusive_ms.saturating_sub(children_ms);

    if let Some(record) = node.record.as_mut() {
        record.finish(trace_id, parent.cloned());
    }

    node.inclusive_ms = Some(inclusive_ms);
    node.exclusive_ms = Some(exclusive_ms);
    node.operation_stack = stack;

    inclusive_ms
}
