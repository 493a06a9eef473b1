//! Profile Parser
//!
//! Rebuilds per-request execution traces from the flat, interleaved
//! profiling lines a server writes to its log, and renders them as CSV,
//! collapsed flamegraph stacks, Zipkin JSON or a human-readable report.
//!
//! This crate provides the core implementation for the
//! `profile-parser` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! profile-parser --format flamegraph puppetserver.log.gz > stacks.txt
//! ```
//!
//! Library users feed lines to a [`trace::LogReconstructor`] and hand the
//! completed traces to an [`output::Renderer`], or use
//! [`output::render_to_string`] to get the report in memory.

pub mod aggregator;
pub mod commands;
pub mod input;
pub mod output;
pub mod parser;
pub mod trace;
pub mod utils;
