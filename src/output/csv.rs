//! CSV output: one row per span.

use super::Renderer;
use crate::trace::TraceTree;
use crate::utils::error::OutputError;
use chrono::SecondsFormat;
use std::borrow::Cow;
use std::io::Write;

pub const CSV_HEADER: [&str; 6] = [
    "timestamp",
    "trace_id",
    "span_id",
    "name",
    "exclusive_time_ms",
    "inclusive_time_ms",
];

/// Writes a header row, then every span of every trace depth-first
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, traces: &[TraceTree], out: &mut dyn Write) -> Result<(), OutputError> {
        writeln!(out, "{}", CSV_HEADER.join(","))?;

        for trace in traces {
            for (_, node) in trace.iter() {
                let timestamp = node
                    .record
                    .as_ref()
                    .and_then(|r| r.start_time)
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .unwrap_or_default();

                writeln!(
                    out,
                    "{},{},{},{},{},{}",
                    timestamp,
                    trace.trace_id,
                    node.path,
                    escape_field(node.name()),
                    node.exclusive_ms.unwrap_or(0),
                    node.inclusive_ms.unwrap_or(0),
                )?;
            }
        }

        out.flush()?;
        Ok(())
    }
}

/// Quote a field when it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
