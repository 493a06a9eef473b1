//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while classifying profiling lines
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed profiling line: {0}")]
    MalformedProfile(String),

    #[error("Invalid span path '{0}'")]
    InvalidPath(String),

    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),
}

/// Errors raised while placing a record into a trace tree
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("Span {path} does not belong under {node}")]
    OutsideSubtree { path: String, node: String },
}

/// Errors that can occur while acquiring log input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read input: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors that can occur during output rendering
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

impl ParseError {
    /// Short name used in top-level error reports
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MalformedProfile(_) => "MalformedProfile",
            ParseError::InvalidPath(_) => "InvalidPath",
            ParseError::InvalidDuration(_) => "InvalidDuration",
        }
    }
}
