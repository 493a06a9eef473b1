//! Per-kind operation summaries.
//!
//! Aggregates every span of every trace by operation kind and name. The
//! operations with the most exclusive time are the first places to look
//! when a server is slow.

use crate::trace::{OperationKind, TraceTree};
use log::debug;
use std::collections::HashMap;

/// Totals for one operation name
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSummary {
    pub name: String,
    pub count: u64,
    pub exclusive_ms: u64,
    pub inclusive_ms: u64,

    /// Share of all exclusive time in the summarized traces
    pub percentage: f64,
}

/// Summary table for one operation kind
#[derive(Debug, Clone, PartialEq)]
pub struct KindSummary {
    pub kind: OperationKind,

    /// Sorted by exclusive time, descending
    pub operations: Vec<OperationSummary>,
    pub exclusive_ms: u64,
}

/// Summarize spans by kind and name
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `traces` - Finalized traces
/// * `top_n` - Maximum rows kept per kind
///
/// # Returns
/// One summary per kind that has at least one span, in `OperationKind::ALL` order
pub fn summarize_by_kind(traces: &[TraceTree], top_n: usize) -> Vec<KindSummary> {
    let mut totals: HashMap<(OperationKind, &str), (u64, u64, u64)> = HashMap::new();
    let mut grand_total: u64 = 0;

    for (_, node) in traces.iter().flat_map(|t| t.iter()) {
        if node.is_placeholder() {
            continue;
        }
        let exclusive = node.exclusive_ms.unwrap_or(0);
        let inclusive = node.inclusive_ms.unwrap_or(0);
        grand_total = grand_total.saturating_add(exclusive);

        let entry = totals.entry((node.kind(), node.name())).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(exclusive);
        entry.2 = entry.2.saturating_add(inclusive);
    }

    let summaries: Vec<KindSummary> = OperationKind::ALL
        .iter()
        .filter_map(|&kind| {
            let mut operations: Vec<OperationSummary> = totals
                .iter()
                .filter(|((k, _), _)| *k == kind)
                .map(|((_, name), &(count, exclusive_ms, inclusive_ms))| OperationSummary {
                    name: name.to_string(),
                    count,
                    exclusive_ms,
                    inclusive_ms,
                    percentage: percentage(exclusive_ms, grand_total),
                })
                .collect();

            if operations.is_empty() {
                return None;
            }

            // Ties broken by name so output is stable across runs
            operations.sort_by(|a, b| b.exclusive_ms.cmp(&a.exclusive_ms).then_with(|| a.name.cmp(&b.name)));
            let exclusive_ms = operations.iter().map(|o| o.exclusive_ms).fold(0, u64::saturating_add);
            operations.truncate(top_n);

            Some(KindSummary {
                kind,
                operations,
                exclusive_ms,
            })
        })
        .collect();

    debug!("Summarized {} operation kinds over {} traces", summaries.len(), traces.len());

    summaries
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        part as f64 * 100.0 / total as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{finalize, OperationRecord};
    use pretty_assertions::assert_eq;

    fn record(path: &str, kind: OperationKind, name: &str, seconds: f64) -> OperationRecord {
        OperationRecord::new(path.parse().unwrap(), kind, name, seconds)
    }

    fn sample() -> Vec<TraceTree> {
        let mut tree = TraceTree::new(record("1", OperationKind::HttpRequest, "GET /catalog", 1.0));
        tree.insert(record("1.1", OperationKind::FunctionCall, "lookup", 0.2)).unwrap();
        tree.insert(record("1.2", OperationKind::FunctionCall, "template", 0.3)).unwrap();
        tree.insert(record("1.3", OperationKind::FunctionCall, "lookup", 0.2)).unwrap();
        finalize(&mut tree);
        vec![tree]
    }

    #[test]
    fn test_summaries_sorted_by_exclusive_time() {
        let summaries = summarize_by_kind(&sample(), 10);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kind, OperationKind::FunctionCall);

        let functions = &summaries[0].operations;
        assert_eq!(functions[0].name, "lookup");
        assert_eq!(functions[0].count, 2);
        assert_eq!(functions[0].exclusive_ms, 400);
        assert_eq!(functions[0].percentage, 40.0);
        assert_eq!(functions[1].name, "template");

        assert_eq!(summaries[1].kind, OperationKind::HttpRequest);
        assert_eq!(summaries[1].exclusive_ms, 300);
    }

    #[test]
    fn test_top_n_truncates_rows_not_totals() {
        let summaries = summarize_by_kind(&sample(), 1);

        assert_eq!(summaries[0].operations.len(), 1);
        assert_eq!(summaries[0].exclusive_ms, 700);
    }

    #[test]
    fn test_empty_input() {
        assert!(summarize_by_kind(&[], 10).is_empty());
    }
}
