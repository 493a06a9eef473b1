//! Log line tokenization and profiling record classification.
//!
//! This module handles:
//! - Splitting raw log lines into timestamp, thread and message
//! - Recognizing profiling messages
//! - Classifying them into operation records

pub mod classifier;
pub mod line;

// Re-export main types
pub use classifier::classify;
pub use line::{parse_timestamp, tokenize, LineMetadata, LogLine};
