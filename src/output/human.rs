//! Human-readable output.
//!
//! Prints every trace as an indented tree, then one table per operation kind
//! listing the operations that spent the most exclusive time.

use super::Renderer;
use crate::aggregator::{summarize_by_kind, KindSummary};
use crate::trace::{TraceNode, TraceTree};
use crate::utils::error::OutputError;
use colored::{ColoredString, Colorize};
use std::io::Write;

const INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct HumanRenderer {
    color: bool,
    top: usize,
}

impl HumanRenderer {
    pub fn new(color: bool, top: usize) -> Self {
        Self { color, top }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn render_trace(&self, trace: &TraceTree, out: &mut dyn Write) -> Result<(), OutputError> {
        let heading = format!(
            "Trace {} (thread {}): {} ms",
            trace.trace_id,
            trace.thread_id,
            trace.total_ms()
        );
        writeln!(out, "{}", self.paint(&heading, |s| s.bold()))?;

        for (depth, node) in trace.iter() {
            writeln!(out, "{}{}", INDENT.repeat(depth + 1), self.node_line(node))?;
        }

        writeln!(out)?;
        Ok(())
    }

    fn node_line(&self, node: &TraceNode) -> String {
        let name = if node.is_placeholder() {
            self.paint(node.name(), |s| s.dimmed())
        } else {
            node.name().to_string()
        };

        format!(
            "{} {} ({} ms, {} ms self)",
            self.paint(&node.path.to_string(), |s| s.cyan()),
            name,
            node.inclusive_ms.unwrap_or(0),
            node.exclusive_ms.unwrap_or(0),
        )
    }

    fn render_summary(&self, summary: &KindSummary, out: &mut dyn Write) -> Result<(), OutputError> {
        let heading = format!("{} ({} ms self)", summary.kind.title(), summary.exclusive_ms);
        writeln!(out, "{}", self.paint(&heading, |s| s.bold().underline()))?;

        let name_width = summary
            .operations
            .iter()
            .map(|o| o.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());

        writeln!(
            out,
            "{}{:<name_width$}  {:>7}  {:>10}  {:>10}  {:>7}",
            INDENT, "Name", "Count", "Self ms", "Total ms", "% Self",
        )?;

        for op in &summary.operations {
            writeln!(
                out,
                "{}{:<name_width$}  {:>7}  {:>10}  {:>10}  {:>6.1}%",
                INDENT, op.name, op.count, op.exclusive_ms, op.inclusive_ms, op.percentage,
            )?;
        }

        writeln!(out)?;
        Ok(())
    }
}

impl Renderer for HumanRenderer {
    fn render(&self, traces: &[TraceTree], out: &mut dyn Write) -> Result<(), OutputError> {
        for trace in traces {
            self.render_trace(trace, out)?;
        }

        let summaries = summarize_by_kind(traces, self.top);
        if !summaries.is_empty() {
            writeln!(out, "{}", self.paint(&"=".repeat(80), |s| s.dimmed()))?;
            writeln!(out, "{}", self.paint("PROFILE SUMMARY", |s| s.bold()))?;
            writeln!(out, "{}\n", self.paint(&"=".repeat(80), |s| s.dimmed()))?;
        }
        for summary in &summaries {
            self.render_summary(summary, out)?;
        }

        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::render_to_string;
    use crate::trace::{finalize, OperationKind, OperationRecord};

    fn trace() -> TraceTree {
        let mut tree = TraceTree::new(OperationRecord::new(
            "1".parse().unwrap(),
            OperationKind::HttpRequest,
            "GET /puppet/v3/catalog",
            1.0,
        ));
        tree.insert(OperationRecord::new(
            "1.1.1".parse().unwrap(),
            OperationKind::FunctionCall,
            "lookup",
            0.25,
        ))
        .unwrap();
        finalize(&mut tree);
        tree
    }

    #[test]
    fn test_plain_output_has_tree_and_tables() {
        let tree = trace();
        let text = render_to_string(&HumanRenderer::new(false, 10), std::slice::from_ref(&tree)).unwrap();

        assert!(text.contains(&format!("Trace {} (thread ): 1000 ms", tree.trace_id)));
        assert!(text.contains("  1 GET /puppet/v3/catalog (1000 ms, 750 ms self)"));
        assert!(text.contains("    1.1 <unknown> (250 ms, 0 ms self)"));
        assert!(text.contains("      1.1.1 lookup (250 ms, 250 ms self)"));
        assert!(text.contains("Function Calls (250 ms self)"));
        assert!(text.contains("HTTP Requests (750 ms self)"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_tables_sorted_descending() {
        let mut tree = TraceTree::new(OperationRecord::new(
            "1".parse().unwrap(),
            OperationKind::Other,
            "root",
            1.0,
        ));
        tree.insert(OperationRecord::new("1.1".parse().unwrap(), OperationKind::FunctionCall, "small", 0.1))
            .unwrap();
        tree.insert(OperationRecord::new("1.2".parse().unwrap(), OperationKind::FunctionCall, "big", 0.5))
            .unwrap();
        finalize(&mut tree);

        let text = render_to_string(&HumanRenderer::new(false, 10), &[tree]).unwrap();
        let table = &text[text.find("Function Calls").unwrap()..];

        assert!(table.find("big").unwrap() < table.find("small").unwrap());
    }
}
