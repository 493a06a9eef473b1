//! Line-by-line trace reconstruction.
//!
//! Routes each classified record to the assembler of the thread that logged
//! it and collects completed traces in completion order.

use super::assembler::ThreadAssembler;
use super::tree::TraceTree;
use crate::parser::{classify, tokenize};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::collections::HashMap;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructStats {
    pub lines: usize,
    pub unparseable_lines: usize,
    pub records: usize,
    pub traces: usize,
}

/// Reconstruction driver for one sequential log stream
#[derive(Debug, Default)]
pub struct LogReconstructor {
    assemblers: HashMap<String, ThreadAssembler>,
    traces: Vec<TraceTree>,
    stats: ReconstructStats,
}

impl LogReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw log line
    ///
    /// **Public** - main entry point for reconstruction
    ///
    /// # Returns
    /// The trace completed by this line, if any
    ///
    /// # Errors
    /// * `ParseError::MalformedProfile` - a profiling line without the expected structure
    pub fn process(&mut self, line: &str) -> Result<Option<&TraceTree>, ParseError> {
        self.stats.lines += 1;

        let Some(parsed) = tokenize(line) else {
            warn!("Skipping unparseable log line: {}", line);
            self.stats.unparseable_lines += 1;
            return Ok(None);
        };

        let meta = parsed.metadata();
        let Some(record) = classify(&parsed.message, &meta)? else {
            return Ok(None);
        };
        self.stats.records += 1;

        let assembler = self
            .assemblers
            .entry(meta.thread_id)
            .or_insert_with_key(|thread_id| ThreadAssembler::new(thread_id.as_str()));

        match assembler.submit(record) {
            Some(tree) => {
                self.stats.traces += 1;
                self.traces.push(tree);
                Ok(self.traces.last())
            }
            None => Ok(None),
        }
    }

    pub fn traces(&self) -> &[TraceTree] {
        &self.traces
    }

    pub fn stats(&self) -> ReconstructStats {
        self.stats
    }

    /// Records still waiting for a root, across all threads
    pub fn pending_records(&self) -> usize {
        self.assemblers.values().map(ThreadAssembler::pending).sum()
    }

    /// Finish the stream and return completed traces in completion order
    ///
    /// Records whose root never arrived are discarded here.
    pub fn finish(self) -> Vec<TraceTree> {
        let pending = self.pending_records();
        if pending > 0 {
            debug!(
                "Discarding {} records from {} threads with no root span",
                pending,
                self.assemblers.values().filter(|a| a.pending() > 0).count()
            );
        }

        self.traces
    }
}
