//! Configuration and constants for the CLI.

/// Marker that identifies a profiling message inside a log line
pub const PROFILE_MARKER: &str = "PROFILE [";

/// Display name for tree nodes whose own record was never logged
pub const PLACEHOLDER_NAME: &str = "<unknown>";

/// Service name reported in Zipkin local endpoints
pub const ZIPKIN_SERVICE_NAME: &str = "puppetserver";

/// Default number of rows per summary table in human output
pub const DEFAULT_TOP_OPERATIONS: usize = 20;
pub const MAX_TOP_OPERATIONS: usize = 10_000;

/// File suffix that triggers transparent gzip decoding
pub const GZIP_SUFFIX: &str = ".gz";

/// Environment variable that can supply the output format
pub const FORMAT_ENV_VAR: &str = "PROFILE_PARSER_FORMAT";

// Span ids in Zipkin output are this many hex chars of a SHA-256 digest
pub const ZIPKIN_SPAN_ID_LEN: usize = 16;
