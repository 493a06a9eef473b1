//! Classify profiling messages into operation records.
//!
//! A profiling message has the shape
//! `PROFILE [<profiler id>] <path> <body>: took <seconds> seconds`
//! and the body decides the operation kind:
//!
//! | body                              | kind                 |
//! |-----------------------------------|----------------------|
//! | `Called X`                        | function call        |
//! | `Evaluated resource T[N]`         | resource evaluation  |
//! | `PuppetDB: ...`, `Submitted query ...` | data store call |
//! | `Processed request M P`           | HTTP request         |
//! | anything else                     | other                |

use super::line::LineMetadata;
use crate::trace::record::{OperationKind, OperationRecord, SpanPath};
use crate::utils::config::PROFILE_MARKER;
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

static PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PROFILE \[(?P<profiler>[^\]]*)\] (?P<path>\d+(?:\.\d+)*) (?P<body>.*): took (?P<duration>\d+(?:\.\d+)?) seconds\s*$")
        .expect("profile pattern is valid")
});

static FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Called (?P<function>\S.*)$").expect("function pattern is valid"));

static RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Evaluated resource (?P<type>[\w:]+)\[(?P<title>.*)\]$").expect("resource pattern is valid")
});

static DATA_STORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:PuppetDB: .+|Submitted query .+)$").expect("data store pattern is valid")
});

static HTTP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Processed request (?P<method>[A-Z]+) (?P<url>/[^\s?]*)(?:\?\S*)?$")
        .expect("http pattern is valid")
});

// Node-scoped endpoints carry the requesting host after the endpoint name
static HTTP_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>/puppet(?:-ca)?/v\d+/[^/]+)/(?P<host>[^/]+)").expect("host pattern is valid")
});

const RESOURCE_PREFIX: &str = "Evaluated resource ";
const HTTP_PREFIX: &str = "Processed request ";

/// Turn a log message into an operation record
///
/// **Public** - used by the reconstructor for every tokenized line
///
/// # Returns
/// * `Ok(None)` - the message is not a profiling message
/// * `Ok(Some(record))` - a classified profiling record
///
/// # Errors
/// * `ParseError::MalformedProfile` - the message carries the profiling
///   marker but not the expected structure
pub fn classify(message: &str, meta: &LineMetadata) -> Result<Option<OperationRecord>, ParseError> {
    if !message.contains(PROFILE_MARKER) {
        return Ok(None);
    }

    let caps = PROFILE_RE
        .captures(message)
        .ok_or_else(|| ParseError::MalformedProfile(message.to_string()))?;

    let path: SpanPath = caps["path"].parse()?;
    let duration_seconds: f64 = caps["duration"]
        .parse()
        .map_err(|_| ParseError::InvalidDuration(caps["duration"].to_string()))?;

    let mut record = classify_body(&caps["body"], path, duration_seconds)?
        .with_thread(meta.thread_id.as_str());
    record.profiler_id = caps["profiler"].to_string();
    record.timestamp = meta.timestamp;

    Ok(Some(record))
}

/// Pick the kind, name and tags from the message body
fn classify_body(body: &str, path: SpanPath, duration: f64) -> Result<OperationRecord, ParseError> {
    if let Some(caps) = FUNCTION_RE.captures(body) {
        let function = &caps["function"];
        return Ok(OperationRecord::new(path, OperationKind::FunctionCall, function, duration)
            .with_tag("function", function));
    }

    if body.starts_with(RESOURCE_PREFIX) {
        let caps = RESOURCE_RE
            .captures(body)
            .ok_or_else(|| ParseError::MalformedProfile(body.to_string()))?;
        let (kind, title) = (&caps["type"], &caps["title"]);

        return Ok(OperationRecord::new(
            path,
            OperationKind::ResourceEvaluation,
            format!("{}[{}]", kind, title),
            duration,
        )
        .with_tag("resource_type", kind)
        .with_tag("resource_title", title));
    }

    if DATA_STORE_RE.is_match(body) {
        return Ok(OperationRecord::new(path, OperationKind::DataStoreCall, body, duration));
    }

    if body.starts_with(HTTP_PREFIX) {
        let caps = HTTP_RE
            .captures(body)
            .ok_or_else(|| ParseError::MalformedProfile(body.to_string()))?;
        return Ok(http_record(path, &caps["method"], &caps["url"], duration));
    }

    Ok(OperationRecord::new(path, OperationKind::Other, body, duration))
}

fn http_record(path: SpanPath, method: &str, url: &str, duration: f64) -> OperationRecord {
    let (endpoint, host) = match HTTP_HOST_RE.captures(url) {
        Some(caps) => (caps["prefix"].to_string(), Some(caps["host"].to_string())),
        None => (url.to_string(), None),
    };

    let record = OperationRecord::new(
        path,
        OperationKind::HttpRequest,
        format!("{} {}", method, endpoint),
        duration,
    )
    .with_tag("http.method", method)
    .with_tag("http.url", url);

    match host {
        Some(host) => record.with_tag("peer.hostname", host),
        None => record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta() -> LineMetadata {
        LineMetadata {
            timestamp: None,
            thread_id: "qtp-1".to_string(),
        }
    }

    fn classify_ok(message: &str) -> OperationRecord {
        classify(message, &meta()).unwrap().unwrap()
    }

    #[test]
    fn test_non_profiling_message() {
        assert!(classify("Puppet Caching node for foo", &meta()).unwrap().is_none());
    }

    #[test]
    fn test_function_call() {
        let record = classify_ok("Puppet PROFILE [7] 1.2.1 Called lookup: took 0.0123 seconds");

        assert_eq!(record.kind, OperationKind::FunctionCall);
        assert_eq!(record.name, "lookup");
        assert_eq!(record.path.to_string(), "1.2.1");
        assert_eq!(record.duration_seconds, 0.0123);
        assert_eq!(record.profiler_id, "7");
        assert_eq!(record.thread_id, "qtp-1");
    }

    #[test]
    fn test_resource_evaluation() {
        let record = classify_ok("PROFILE [7] 1.3 Evaluated resource File[/etc/motd]: took 0.002 seconds");

        assert_eq!(record.kind, OperationKind::ResourceEvaluation);
        assert_eq!(record.name, "File[/etc/motd]");
        assert_eq!(record.tags["resource_type"], "File");
        assert_eq!(record.tags["resource_title"], "/etc/motd");
    }

    #[test]
    fn test_data_store_calls() {
        let a = classify_ok("PROFILE [7] 1.4 PuppetDB: Submitted command 'replace facts' version 5: took 0.1 seconds");
        let b = classify_ok("PROFILE [7] 1.5 Submitted query nodes: took 0.1 seconds");

        assert_eq!(a.kind, OperationKind::DataStoreCall);
        assert_eq!(b.kind, OperationKind::DataStoreCall);
        assert_eq!(b.name, "Submitted query nodes");
    }

    #[test]
    fn test_http_request_with_host() {
        let record = classify_ok(
            "PROFILE [7] 1 Processed request POST /puppet/v3/catalog/agent01.example.com: took 2.5 seconds",
        );

        assert_eq!(record.kind, OperationKind::HttpRequest);
        assert_eq!(record.name, "POST /puppet/v3/catalog");
        assert_eq!(record.tags["http.method"], "POST");
        assert_eq!(record.tags["peer.hostname"], "agent01.example.com");
    }

    #[test]
    fn test_http_request_without_host() {
        let record = classify_ok("PROFILE [7] 1 Processed request GET /puppet/v3/environments: took 0.5 seconds");

        assert_eq!(record.kind, OperationKind::HttpRequest);
        assert_eq!(record.tags["http.method"], "GET");
        assert!(!record.tags.contains_key("peer.hostname"));
    }

    #[test]
    fn test_unrecognized_body_is_other() {
        let record = classify_ok("PROFILE [7] 1.1 Compiled catalog for agent01: took 1.0 seconds");

        assert_eq!(record.kind, OperationKind::Other);
        assert_eq!(record.name, "Compiled catalog for agent01");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_malformed_profile_lines() {
        let cases = [
            "PROFILE [7] Called lookup without timing",
            "PROFILE [7] 1.1 Evaluated resource not-a-resource: took 0.1 seconds",
            "PROFILE [7] 1.1 Processed request nonsense: took 0.1 seconds",
        ];

        for message in cases {
            let err = classify(message, &meta()).unwrap_err();
            assert!(matches!(err, ParseError::MalformedProfile(_)), "{}", message);
        }
    }
}
