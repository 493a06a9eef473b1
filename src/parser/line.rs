//! Outer log line grammar.
//!
//! Lines look like:
//! `2019-06-18T15:50:31.579-07:00 INFO  [qtp1813373127-66] [puppetserver] Puppet PROFILE [...] ...`

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<timestamp>\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\s+(?P<level>[A-Z]+)\s+\[(?P<thread>[^\]]+)\]\s+\[(?P<class>[^\]]+)\]\s+(?P<message>.*)$",
    )
    .expect("log line pattern is valid")
});

/// A tokenized log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: String,
    pub thread_id: String,
    pub class: String,
    pub message: String,
}

/// Metadata handed to the classifier alongside the message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMetadata {
    pub timestamp: Option<DateTime<Utc>>,
    pub thread_id: String,
}

impl LogLine {
    pub fn metadata(&self) -> LineMetadata {
        LineMetadata {
            timestamp: self.timestamp,
            thread_id: self.thread_id.clone(),
        }
    }
}

/// Split a raw line into its fields
///
/// Returns `None` when the line does not follow the log grammar (stack
/// traces, blank lines, foreign formats).
pub fn tokenize(line: &str) -> Option<LogLine> {
    let caps = LINE_RE.captures(line.trim_end_matches(['\r', '\n']))?;

    Some(LogLine {
        timestamp: parse_timestamp(&caps["timestamp"]),
        level: caps["level"].to_string(),
        thread_id: caps["thread"].to_string(),
        class: caps["class"].to_string(),
        message: caps["message"].to_string(),
    })
}

/// Parse a log timestamp
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DD HH:MM:SS[,.]fff`
/// which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.replacen(',', ".", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offsets without a colon, e.g. -0700
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| naive.and_utc())
}
