//! Aggregation of finalized traces into collapsed stacks and summaries.
//!
//! This module transforms reconstructed traces into:
//! - Collapsed stack format (for flamegraph generation)
//! - Per-kind operation summaries (top time consumers)

pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use metrics::{summarize_by_kind, KindSummary, OperationSummary};
pub use stack_builder::{build_collapsed_stacks, sanitize_frame, CollapsedStack};
