//! Trace reconstruction from profiling records.
//!
//! This module transforms flat, interleaved profiling records into:
//! - Per-thread buffers of records awaiting their root
//! - Trace trees positioned by dotted span path
//! - Finalized timings (inclusive / exclusive) and parent links

pub mod assembler;
pub mod finalize;
pub mod reconstructor;
pub mod record;
pub mod tree;

// Re-export main types and functions
pub use assembler::ThreadAssembler;
pub use finalize::finalize;
pub use reconstructor::{LogReconstructor, ReconstructStats};
pub use record::{OperationKind, OperationRecord, SpanPath};
pub use tree::{DepthFirst, TraceNode, TraceTree};
