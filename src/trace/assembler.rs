//! Per-thread buffering of profiling records.
//!
//! The instrumented server logs a request's root span last, so every record
//! seen on a thread since the previous root belongs to the trace closed by
//! the next root.

use super::finalize::finalize;
use super::record::OperationRecord;
use super::tree::TraceTree;
use log::{debug, warn};

/// Open profile for one producing thread
#[derive(Debug, Default)]
pub struct ThreadAssembler {
    thread_id: String,
    buffer: Vec<OperationRecord>,
}

impl ThreadAssembler {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            buffer: Vec::new(),
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Records waiting for their root
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer `record`; when it is a root, build and finalize the trace
    pub fn submit(&mut self, record: OperationRecord) -> Option<TraceTree> {
        if !record.path.is_root() {
            self.buffer.push(record);
            return None;
        }

        let buffered = std::mem::take(&mut self.buffer);
        let mut tree = TraceTree::new(record);

        for record in buffered {
            let path = record.path.clone();
            if let Err(e) = tree.insert(record) {
                warn!("Dropping span {} on thread {}: {}", path, self.thread_id, e);
            }
        }

        finalize(&mut tree);

        debug!(
            "Completed trace {} on thread {} ({} spans)",
            tree.trace_id,
            self.thread_id,
            tree.iter().count()
        );

        Some(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::record::OperationKind;

    fn record(path: &str, seconds: f64) -> OperationRecord {
        OperationRecord::new(path.parse().unwrap(), OperationKind::Other, path, seconds)
            .with_thread("worker-1")
    }

    #[test]
    fn test_open_until_root() {
        let mut assembler = ThreadAssembler::new("worker-1");

        assert!(assembler.submit(record("1.1", 0.5)).is_none());
        assert!(assembler.submit(record("1.2", 0.75)).is_none());
        assert_eq!(assembler.pending(), 2);

        let tree = assembler.submit(record("1", 1.5)).unwrap();
        assert_eq!(assembler.pending(), 0);
        assert!(tree.is_finalized());
        assert_eq!(tree.thread_id, "worker-1");
        assert_eq!(tree.root.children.len(), 2);
        assert_eq!(tree.root.exclusive_ms, Some(250));
    }

    #[test]
    fn test_root_reopens_buffer() {
        let mut assembler = ThreadAssembler::new("worker-1");

        assembler.submit(record("1.1", 0.1));
        let first = assembler.submit(record("1", 0.2)).unwrap();

        assembler.submit(record("1.1", 0.3));
        assembler.submit(record("1.2", 0.3));
        let second = assembler.submit(record("1", 1.0)).unwrap();

        assert_eq!(first.root.children.len(), 1);
        assert_eq!(second.root.children.len(), 2);
        assert_ne!(first.trace_id, second.trace_id);
    }

    #[test]
    fn test_lone_root() {
        let mut assembler = ThreadAssembler::new("worker-1");
        let tree = assembler.submit(record("1", 0.25)).unwrap();

        assert!(tree.root.children.is_empty());
        assert_eq!(tree.root.exclusive_ms, Some(250));
    }
}
