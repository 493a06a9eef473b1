//! Operation records and span paths.
//!
//! One `OperationRecord` is produced per profiling log line. Records are
//! immutable after classification except for the annotations the finalizer
//! stamps on them once a trace is complete.

use crate::utils::error::ParseError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Category of a profiled operation, decided by which message pattern matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FunctionCall,
    ResourceEvaluation,
    DataStoreCall,
    HttpRequest,
    Other,
}

impl OperationKind {
    /// All kinds, in report order
    pub const ALL: [OperationKind; 5] = [
        OperationKind::FunctionCall,
        OperationKind::ResourceEvaluation,
        OperationKind::DataStoreCall,
        OperationKind::HttpRequest,
        OperationKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::FunctionCall => "function_call",
            OperationKind::ResourceEvaluation => "resource_evaluation",
            OperationKind::DataStoreCall => "data_store_call",
            OperationKind::HttpRequest => "http_request",
            OperationKind::Other => "other",
        }
    }

    /// Heading used for summary tables
    pub fn title(&self) -> &'static str {
        match self {
            OperationKind::FunctionCall => "Function Calls",
            OperationKind::ResourceEvaluation => "Resource Evaluations",
            OperationKind::DataStoreCall => "Data Store Calls",
            OperationKind::HttpRequest => "HTTP Requests",
            OperationKind::Other => "Other Operations",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted positional identifier of a span within its trace, e.g. `1.2.3`
///
/// The number of segments is the nesting depth; the last segment orders
/// siblings. The root of every trace is the single segment `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanPath(Vec<u32>);

impl SpanPath {
    pub fn root() -> Self {
        SpanPath(vec![1])
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0 == [1]
    }

    /// Path of a direct child with the given trailing segment
    pub fn child(&self, segment: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        SpanPath(segments)
    }
}

impl FromStr for SpanPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split('.')
            .map(|part| match part.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ParseError::InvalidPath(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SpanPath(segments))
    }
}

impl fmt::Display for SpanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// One profiled sub-operation, built from exactly one log line
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub path: SpanPath,
    pub kind: OperationKind,
    pub name: String,
    pub duration_seconds: f64,
    pub tags: BTreeMap<String, String>,

    /// Time the line was logged, which is when the operation finished
    pub timestamp: Option<DateTime<Utc>>,

    /// Thread of the producing server that logged the line
    pub thread_id: String,

    /// Identifier printed inside `PROFILE [...]`
    pub profiler_id: String,

    // Finalize-time annotations
    pub trace_id: Option<String>,
    pub parent: Option<SpanPath>,
    pub start_time: Option<DateTime<Utc>>,
}

impl OperationRecord {
    pub fn new(path: SpanPath, kind: OperationKind, name: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            path,
            kind,
            name: name.into(),
            duration_seconds,
            tags: BTreeMap::new(),
            timestamp: None,
            thread_id: String::new(),
            profiler_id: String::new(),
            trace_id: None,
            parent: None,
            start_time: None,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }

    /// Stamp trace linkage and compute the start time from the finish timestamp
    ///
    /// The start time stays `None` when it would fall outside the
    /// representable date range.
    pub(crate) fn finish(&mut self, trace_id: &str, parent: Option<SpanPath>) {
        self.trace_id = Some(trace_id.to_string());
        self.parent = parent;
        self.start_time = self.timestamp.and_then(|finished| {
            let micros = (self.duration_seconds * 1_000_000.0) as i64;
            finished.checked_sub_signed(Duration::microseconds(micros))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_span_path_parse_and_display() {
        let path: SpanPath = "1.12.3".parse().unwrap();
        assert_eq!(path.segments(), &[1, 12, 3]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.to_string(), "1.12.3");
        assert!(!path.is_root());
        assert!("1".parse::<SpanPath>().unwrap().is_root());
    }

    #[test]
    fn test_span_path_rejects_garbage() {
        assert!("".parse::<SpanPath>().is_err());
        assert!("1..2".parse::<SpanPath>().is_err());
        assert!("1.0".parse::<SpanPath>().is_err());
        assert!("1.a".parse::<SpanPath>().is_err());
    }

    #[test]
    fn test_finish_computes_start_time() {
        let finished = Utc.with_ymd_and_hms(2019, 6, 18, 12, 0, 2).unwrap();
        let mut record = OperationRecord::new(SpanPath::root(), OperationKind::Other, "root", 1.5)
            .with_timestamp(finished);

        record.finish("abc", None);

        assert_eq!(record.trace_id.as_deref(), Some("abc"));
        assert_eq!(record.start_time, Some(finished - Duration::milliseconds(1500)));
    }

    #[test]
    fn test_finish_without_timestamp() {
        let mut record = OperationRecord::new("1.1".parse().unwrap(), OperationKind::Other, "x", 0.1);
        record.finish("abc", Some(SpanPath::root()));

        assert_eq!(record.parent, Some(SpanPath::root()));
        assert!(record.start_time.is_none());
    }

    #[test]
    fn test_finish_with_out_of_range_start() {
        let finished = Utc.with_ymd_and_hms(2019, 6, 18, 12, 0, 2).unwrap();
        let mut record = OperationRecord::new(SpanPath::root(), OperationKind::Other, "root", 10_000_000_000_000.0)
            .with_timestamp(finished);

        record.finish("abc", None);

        assert_eq!(record.trace_id.as_deref(), Some("abc"));
        assert!(record.start_time.is_none());
    }
}
