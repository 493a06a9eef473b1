//! Zipkin v2 JSON output (`ListOfSpans`).
//!
//! Span and parent ids must be 16 lower-hex characters; they are derived
//! from a SHA-256 digest of `<trace id>:<span path>` so they are stable for
//! a given trace and unique across traces.

use super::Renderer;
use crate::trace::{SpanPath, TraceNode, TraceTree};
use crate::utils::config::{ZIPKIN_SERVICE_NAME, ZIPKIN_SPAN_ID_LEN};
use crate::utils::error::OutputError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;

/// One element of a Zipkin `ListOfSpans`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipkinSpan {
    pub trace_id: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,

    /// Start time, microseconds since the epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Microseconds
    pub duration: u64,
    pub local_endpoint: Endpoint,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub service_name: String,
}

#[derive(Debug, Clone)]
pub struct ZipkinRenderer {
    service_name: String,
}

impl Default for ZipkinRenderer {
    fn default() -> Self {
        Self {
            service_name: ZIPKIN_SERVICE_NAME.to_string(),
        }
    }
}

impl ZipkinRenderer {
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Convert traces to Zipkin spans, skipping spans with no measurable time
    ///
    /// Placeholders and zero-length spans are not emitted, so each span's
    /// `parentId` names its nearest ancestor that is.
    pub fn spans(&self, traces: &[TraceTree]) -> Vec<ZipkinSpan> {
        let mut spans = Vec::new();
        for trace in traces {
            self.collect(trace, &trace.root, None, &mut spans);
        }
        spans
    }

    fn collect(&self, trace: &TraceTree, node: &TraceNode, parent_id: Option<&str>, spans: &mut Vec<ZipkinSpan>) {
        let emitted = self.span(trace, node, parent_id);
        let parent_id = match &emitted {
            Some(span) => Some(span.id.clone()),
            None => parent_id.map(str::to_string),
        };
        if let Some(span) = emitted {
            spans.push(span);
        }

        for child in node.children.values() {
            self.collect(trace, child, parent_id.as_deref(), spans);
        }
    }

    fn span(&self, trace: &TraceTree, node: &TraceNode, parent_id: Option<&str>) -> Option<ZipkinSpan> {
        if node.inclusive_ms.unwrap_or(0) == 0 {
            return None;
        }
        let record = node.record.as_ref()?;

        Some(ZipkinSpan {
            trace_id: trace.trace_id.clone(),
            id: span_id(&trace.trace_id, &node.path),
            parent_id: parent_id.map(str::to_string),
            name: record.name.clone(),
            timestamp: record.start_time.map(|t| t.timestamp_micros()),
            duration: (record.duration_seconds * 1_000_000.0) as u64,
            local_endpoint: Endpoint {
                service_name: self.service_name.clone(),
            },
            tags: record.tags.clone(),
        })
    }
}

impl Renderer for ZipkinRenderer {
    fn render(&self, traces: &[TraceTree], out: &mut dyn Write) -> Result<(), OutputError> {
        let spans = self.spans(traces);
        serde_json::to_writer_pretty(&mut *out, &spans)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// 16 hex chars identifying `path` within `trace_id`
pub fn span_id(trace_id: &str, path: &SpanPath) -> String {
    let digest = Sha256::digest(format!("{}:{}", trace_id, path).as_bytes());
    digest
        .iter()
        .take(ZIPKIN_SPAN_ID_LEN / 2)
        .map(|b| format!("{:02x}", b))
        .collect()
}
